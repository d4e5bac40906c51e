use std::sync::Arc;

use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::foursquare::{CoffeeShop, LatLng, Location, VenueSearch};
use crate::genre::normalize_genre;
use crate::session::state::{AppState, Effect, Event, MAP_ZOOM, Section};
use crate::spotify::{
    AuthHeader, PlaylistFetcher, PlaylistRotator, SpotifyClient, TokenSource, embed_url,
};

type VenueTask = JoinHandle<Result<Vec<CoffeeShop>>>;

/// Turns page events into effects.
///
/// The session owns the page state, the playlist rotator and the
/// coffee-shop search started by the last location submit.
pub struct Session<P, V> {
    state: AppState,
    rotator: PlaylistRotator<P>,
    venues: Arc<V>,
    pending_venues: Option<VenueTask>,
    embed_theme: String,
}

impl<P: PlaylistFetcher, V: VenueSearch> Session<P, V> {
    pub fn new(fetcher: P, venues: V, embed_theme: &str) -> Self {
        Self {
            state: AppState::default(),
            rotator: PlaylistRotator::new(fetcher),
            venues: Arc::new(venues),
            pending_venues: None,
            embed_theme: embed_theme.to_string(),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn rotator(&self) -> &PlaylistRotator<P> {
        &self.rotator
    }

    pub async fn handle(&mut self, event: Event) -> Result<Vec<Effect>> {
        debug!("Handling {:?}", event);

        let result = match event {
            Event::PlaceSelected(location) => self.place_selected(location).await,
            Event::SubmitLocation => self.submit_location().await,
            Event::GenreChosen(genre) => Ok(self.genre_chosen(&genre)),
            Event::SubmitMusic | Event::Reload => self.submit_music().await,
            Event::NewPlaylist => Ok(vec![self.new_playlist()]),
            Event::ChangeMusic => Ok(vec![Effect::scroll_to(Section::Music)]),
            Event::ChangeLocation => Ok(vec![Effect::scroll_to(Section::Landing)]),
        };

        match result {
            Err(AppError::IncompleteInput(text)) => Ok(vec![incomplete(text)]),
            other => other,
        }
    }

    async fn place_selected(&mut self, location: Location) -> Result<Vec<Effect>> {
        let mut effects = vec![Effect::MapTitle {
            text: format!("Coffee shops near {}", location.name),
        }];

        self.state.location = Some(location);
        match self.submit_location().await {
            Ok(more) => effects.extend(more),
            Err(AppError::IncompleteInput(text)) => effects.push(incomplete(text)),
            Err(e) => return Err(e),
        }

        Ok(effects)
    }

    async fn submit_location(&mut self) -> Result<Vec<Effect>> {
        let center = match &self.state.location {
            Some(location) if !location.address.trim().is_empty() => location.position,
            _ => {
                return Err(AppError::IncompleteInput(
                    "Please Type in a Location!".into(),
                ));
            }
        };

        self.pending_venues = Some(self.spawn_venue_search(center));

        if !self.state.results_showing {
            return Ok(vec![Effect::ShowMusic, Effect::scroll_to(Section::Music)]);
        }

        let mut effects = vec![Effect::scroll_to(Section::Results)];
        match flatten(self.venue_task(center).await) {
            Ok(shops) => {
                self.state.coffee_shops = shops;
                effects.push(Effect::ClearMap);
                effects.push(self.render_map());
            }
            Err(e) => {
                warn!("Coffee shop search failed: {}", e);
                effects.push(Effect::LoadFailed {
                    reason: e.to_string(),
                });
            }
        }

        Ok(effects)
    }

    fn genre_chosen(&mut self, genre: &str) -> Vec<Effect> {
        if genre.trim().is_empty() {
            self.state.genre = None;
            return Vec::new();
        }

        let genre = normalize_genre(genre);
        self.state.genre = Some(genre.clone());
        vec![Effect::GenreSelected { genre }]
    }

    async fn submit_music(&mut self) -> Result<Vec<Effect>> {
        let genre = self.state.genre.clone().ok_or_else(|| {
            AppError::IncompleteInput(
                "Please pick from either the genres provided or from the \"Other\" menu.".into(),
            )
        })?;

        self.rotator.reset_for_new_genre();
        self.state.results_showing = true;

        let mut effects = vec![
            Effect::ShowLoading,
            Effect::ShowResults,
            Effect::scroll_to(Section::Results),
        ];

        let venue_task = self.venue_task(self.state.center());
        let (playlists, shops) = tokio::join!(self.rotator.fetch_page(&genre, 0), venue_task);
        let shops = flatten(shops);

        let outcome = playlists.and_then(|page| {
            if page.is_empty() {
                return Err(AppError::SpotifyApi {
                    status: 404,
                    message: format!("No playlists found for {}", genre),
                });
            }
            shops
        });

        match outcome {
            Ok(shops) => {
                info!("Showing {} coffee shops with {} playlists", shops.len(), genre);
                self.state.coffee_shops = shops;
                effects.push(self.next_playlist()?);
                effects.push(self.render_map());
                effects.push(Effect::HideLoading);
            }
            Err(e) => {
                warn!("Failed to load results for {}: {}", genre, e);
                effects.push(Effect::LoadFailed {
                    reason: e.to_string(),
                });
            }
        }

        Ok(effects)
    }

    /// Hands out the next playlist. Running out of playlists shows up as a
    /// load failure rather than an error.
    fn new_playlist(&self) -> Effect {
        match self.next_playlist() {
            Ok(effect) => effect,
            Err(e) => {
                warn!("No playlist to show: {}", e);
                Effect::LoadFailed {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn next_playlist(&self) -> Result<Effect> {
        let uri = self.rotator.next()?;
        let src = embed_url(&uri, &self.embed_theme);
        Ok(Effect::EmbedPlaylist { uri, src })
    }

    fn render_map(&self) -> Effect {
        Effect::RenderMap {
            center: self.state.center(),
            zoom: MAP_ZOOM,
            shops: self.state.coffee_shops.clone(),
        }
    }

    fn spawn_venue_search(&self, center: LatLng) -> VenueTask {
        let venues = Arc::clone(&self.venues);
        tokio::spawn(async move { venues.search_coffee_shops(center).await })
    }

    /// The search started by the last location submit, or a fresh one when
    /// none is pending.
    fn venue_task(&mut self, center: LatLng) -> VenueTask {
        match self.pending_venues.take() {
            Some(task) => task,
            None => self.spawn_venue_search(center),
        }
    }
}

fn incomplete(text: String) -> Effect {
    Effect::Notice {
        title: "Incomplete".to_string(),
        text,
    }
}

fn flatten<T>(joined: std::result::Result<Result<T>, JoinError>) -> Result<T> {
    joined?
}

impl<S, V> Session<SpotifyClient<S>, V>
where
    S: TokenSource + 'static,
    V: VenueSearch,
{
    /// Acquires the Spotify token up front so the first search does not wait on it.
    pub async fn authorize(&self) -> Result<AuthHeader> {
        self.rotator.fetcher().tokens().ensure_authorized().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::PlaylistPage;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubFetcher {
        page: Option<PlaylistPage>,
        refill: Option<PlaylistPage>,
        genres: Arc<Mutex<Vec<(String, u32)>>>,
    }

    impl StubFetcher {
        fn with(ids: &[&str]) -> Self {
            Self {
                page: Some(PlaylistPage::mock(ids)),
                refill: None,
                genres: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn failing() -> Self {
            Self {
                page: None,
                refill: None,
                genres: Arc::new(Mutex::new(Vec::new())),
            }
        }

        /// Page served for every fetch past offset 0.
        fn with_refill(mut self, ids: &[&str]) -> Self {
            self.refill = Some(PlaylistPage::mock(ids));
            self
        }
    }

    #[async_trait]
    impl PlaylistFetcher for StubFetcher {
        async fn fetch_playlists(&self, genre: &str, offset: u32) -> Result<PlaylistPage> {
            self.genres.lock().push((genre.to_string(), offset));
            if offset > 0 {
                if let Some(refill) = &self.refill {
                    return Ok(refill.clone());
                }
            }
            self.page.clone().ok_or_else(|| AppError::SpotifyApi {
                status: 500,
                message: "server error".into(),
            })
        }
    }

    struct StubVenues {
        /// Searches from this call on fail.
        fail_from: usize,
        calls: Arc<AtomicUsize>,
    }

    impl StubVenues {
        fn ok() -> Self {
            Self::failing_from(usize::MAX)
        }

        fn failing_from(fail_from: usize) -> Self {
            Self {
                fail_from,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl VenueSearch for StubVenues {
        async fn search_coffee_shops(&self, _center: LatLng) -> Result<Vec<CoffeeShop>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call >= self.fail_from {
                return Err(AppError::FoursquareApi {
                    status: 400,
                    message: "bad ll".into(),
                });
            }
            Ok(vec![CoffeeShop::mock("Pilot"), CoffeeShop::mock("Sam James")])
        }
    }

    fn toronto() -> Location {
        Location::new(
            LatLng::new(43.6532, -79.3832),
            "Toronto, ON, Canada",
            "Toronto",
        )
    }

    fn embedded_uri(effects: &[Effect]) -> Option<&str> {
        effects.iter().find_map(|e| match e {
            Effect::EmbedPlaylist { uri, .. } => Some(uri.as_str()),
            _ => None,
        })
    }

    fn has_load_failure(effects: &[Effect]) -> bool {
        effects
            .iter()
            .any(|e| matches!(e, Effect::LoadFailed { .. }))
    }

    #[tokio::test]
    async fn test_submit_location_without_place_shows_notice() {
        let mut session = Session::new(StubFetcher::with(&["a"]), StubVenues::ok(), "white");

        let effects = session.handle(Event::SubmitLocation).await.unwrap();

        assert_eq!(
            effects,
            vec![Effect::Notice {
                title: "Incomplete".to_string(),
                text: "Please Type in a Location!".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_first_place_reveals_music_section() {
        let mut session = Session::new(StubFetcher::with(&["a"]), StubVenues::ok(), "white");

        let effects = session
            .handle(Event::PlaceSelected(toronto()))
            .await
            .unwrap();

        assert_eq!(
            effects,
            vec![
                Effect::MapTitle {
                    text: "Coffee shops near Toronto".to_string()
                },
                Effect::ShowMusic,
                Effect::scroll_to(Section::Music),
            ]
        );
    }

    #[tokio::test]
    async fn test_submit_music_without_genre_shows_notice() {
        let fetcher = StubFetcher::with(&["a"]);
        let genres = Arc::clone(&fetcher.genres);
        let mut session = Session::new(fetcher, StubVenues::ok(), "white");

        let effects = session.handle(Event::SubmitMusic).await.unwrap();

        assert!(matches!(effects.as_slice(), [Effect::Notice { .. }]));
        assert!(genres.lock().is_empty());
    }

    #[tokio::test]
    async fn test_submit_music_joins_playlists_and_coffee_shops() {
        let fetcher = StubFetcher::with(&["a", "b"]);
        let genres = Arc::clone(&fetcher.genres);
        let venues = StubVenues::ok();
        let venue_calls = Arc::clone(&venues.calls);
        let mut session = Session::new(fetcher, venues, "white");

        session.handle(Event::PlaceSelected(toronto())).await.unwrap();
        session
            .handle(Event::GenreChosen("Hip Hop".into()))
            .await
            .unwrap();
        let effects = session.handle(Event::SubmitMusic).await.unwrap();

        assert_eq!(embedded_uri(&effects), Some("spotify:playlist:a"));
        assert!(effects.iter().any(|e| matches!(
            e,
            Effect::RenderMap { shops, zoom: 13, .. } if shops.len() == 2
        )));
        assert_eq!(effects.last(), Some(&Effect::HideLoading));
        assert_eq!(*genres.lock(), vec![("hiphop".to_string(), 0)]);
        // The search started by the location submit is reused.
        assert_eq!(venue_calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.state().coffee_shops.len(), 2);
        assert!(session.state().results_showing);
    }

    #[tokio::test]
    async fn test_new_playlist_rotates_and_reload_starts_over() {
        let fetcher = StubFetcher::with(&["a", "b", "c"]);
        let mut session = Session::new(fetcher, StubVenues::ok(), "white");
        session.handle(Event::PlaceSelected(toronto())).await.unwrap();
        session.handle(Event::GenreChosen("jazz".into())).await.unwrap();
        session.handle(Event::SubmitMusic).await.unwrap();

        let effects = session.handle(Event::NewPlaylist).await.unwrap();
        assert_eq!(embedded_uri(&effects), Some("spotify:playlist:b"));

        let effects = session.handle(Event::Reload).await.unwrap();
        assert_eq!(embedded_uri(&effects), Some("spotify:playlist:a"));
        assert_eq!(session.rotator().offset(), 1);
    }

    #[tokio::test]
    async fn test_playlist_failure_surfaces_load_error() {
        let mut session = Session::new(StubFetcher::failing(), StubVenues::ok(), "white");
        session.handle(Event::PlaceSelected(toronto())).await.unwrap();
        session.handle(Event::GenreChosen("rock".into())).await.unwrap();

        let effects = session.handle(Event::SubmitMusic).await.unwrap();

        assert!(has_load_failure(&effects));
        assert!(embedded_uri(&effects).is_none());
        assert!(!effects.contains(&Effect::HideLoading));
    }

    #[tokio::test]
    async fn test_venue_failure_surfaces_load_error() {
        let venues = StubVenues::failing_from(0);
        let mut session = Session::new(StubFetcher::with(&["a"]), venues, "white");
        session.handle(Event::PlaceSelected(toronto())).await.unwrap();
        session.handle(Event::GenreChosen("rock".into())).await.unwrap();

        let effects = session.handle(Event::SubmitMusic).await.unwrap();

        assert!(has_load_failure(&effects));
        assert!(embedded_uri(&effects).is_none());
    }

    #[tokio::test]
    async fn test_empty_playlist_page_is_a_load_error() {
        let mut session = Session::new(StubFetcher::with(&[]), StubVenues::ok(), "white");
        session.handle(Event::GenreChosen("sleep".into())).await.unwrap();

        let effects = session.handle(Event::SubmitMusic).await.unwrap();

        assert!(has_load_failure(&effects));
    }

    #[tokio::test]
    async fn test_new_location_with_results_redraws_map() {
        let mut session = Session::new(StubFetcher::with(&["a"]), StubVenues::ok(), "white");
        session.handle(Event::PlaceSelected(toronto())).await.unwrap();
        session.handle(Event::GenreChosen("soul".into())).await.unwrap();
        session.handle(Event::SubmitMusic).await.unwrap();

        let montreal = Location::new(LatLng::new(45.5019, -73.5674), "Montréal, QC", "Montréal");
        let effects = session
            .handle(Event::PlaceSelected(montreal))
            .await
            .unwrap();

        assert_eq!(effects[1], Effect::scroll_to(Section::Results));
        assert_eq!(effects[2], Effect::ClearMap);
        assert!(matches!(
            &effects[3],
            Effect::RenderMap { center, .. } if center.lat == 45.5019
        ));
    }

    #[tokio::test]
    async fn test_new_playlist_before_results_is_a_load_error() {
        let mut session = Session::new(StubFetcher::with(&["a"]), StubVenues::ok(), "white");

        let effects = session.handle(Event::NewPlaylist).await.unwrap();

        assert_eq!(
            effects,
            vec![Effect::LoadFailed {
                reason: AppError::EmptyPage.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_empty_refill_turns_next_playlist_into_load_error() {
        let fetcher = StubFetcher::with(&["a", "b"]).with_refill(&[]);
        let genres = Arc::clone(&fetcher.genres);
        let mut session = Session::new(fetcher, StubVenues::ok(), "white");
        session.handle(Event::PlaceSelected(toronto())).await.unwrap();
        session.handle(Event::GenreChosen("jazz".into())).await.unwrap();
        session.handle(Event::SubmitMusic).await.unwrap();

        let effects = session.handle(Event::NewPlaylist).await.unwrap();
        assert_eq!(embedded_uri(&effects), Some("spotify:playlist:b"));
        session.rotator().settle().await;
        assert_eq!(
            *genres.lock(),
            vec![("jazz".to_string(), 0), ("jazz".to_string(), 2)]
        );

        let effects = session.handle(Event::NewPlaylist).await.unwrap();
        assert!(matches!(effects.as_slice(), [Effect::LoadFailed { .. }]));
    }

    #[tokio::test]
    async fn test_blank_place_keeps_title_and_shows_notice() {
        let mut session = Session::new(StubFetcher::with(&["a"]), StubVenues::ok(), "white");
        let nowhere = Location::new(LatLng::new(0.0, 0.0), "  ", "Nowhere");

        let effects = session.handle(Event::PlaceSelected(nowhere)).await.unwrap();

        assert_eq!(
            effects,
            vec![
                Effect::MapTitle {
                    text: "Coffee shops near Nowhere".to_string()
                },
                Effect::Notice {
                    title: "Incomplete".to_string(),
                    text: "Please Type in a Location!".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_new_location_search_failure_with_results_is_a_load_error() {
        let venues = StubVenues::failing_from(1);
        let mut session = Session::new(StubFetcher::with(&["a"]), venues, "white");
        session.handle(Event::PlaceSelected(toronto())).await.unwrap();
        session.handle(Event::GenreChosen("soul".into())).await.unwrap();
        session.handle(Event::SubmitMusic).await.unwrap();

        let effects = session
            .handle(Event::PlaceSelected(toronto()))
            .await
            .unwrap();

        assert_eq!(effects[1], Effect::scroll_to(Section::Results));
        assert!(matches!(effects[2], Effect::LoadFailed { .. }));
        assert!(!effects.contains(&Effect::ClearMap));
        assert_eq!(session.state().coffee_shops.len(), 2);
    }

    #[tokio::test]
    async fn test_navigation_events_only_scroll() {
        let mut session = Session::new(StubFetcher::with(&["a"]), StubVenues::ok(), "white");

        assert_eq!(
            session.handle(Event::ChangeMusic).await.unwrap(),
            vec![Effect::scroll_to(Section::Music)]
        );
        assert_eq!(
            session.handle(Event::ChangeLocation).await.unwrap(),
            vec![Effect::scroll_to(Section::Landing)]
        );
    }
}
