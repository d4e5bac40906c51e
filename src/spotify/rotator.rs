use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::spotify::models::PlaylistPage;

/// Source of playlist pages for a genre.
#[async_trait]
pub trait PlaylistFetcher: Send + Sync + 'static {
    async fn fetch_playlists(&self, genre: &str, offset: u32) -> Result<PlaylistPage>;
}

#[derive(Debug, Default)]
struct RotationState {
    genre: Option<String>,
    page: PlaylistPage,
    cursor: usize,
    offset: u32,
}

/// Hands out playlists from the current page one at a time and refills the
/// page in the background once every entry has been handed out.
///
/// The refill is not awaited by [`PlaylistRotator::next`]: the cursor goes
/// back to 0 straight away, so a call that lands before the refill resolves
/// replays the old page from the start. Responses are applied in arrival
/// order with no sequence check.
pub struct PlaylistRotator<F> {
    fetcher: Arc<F>,
    state: Arc<Mutex<RotationState>>,
    refill: Mutex<Option<JoinHandle<()>>>,
}

impl<F: PlaylistFetcher> PlaylistRotator<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            state: Arc::new(Mutex::new(RotationState::default())),
            refill: Mutex::new(None),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub async fn fetch_page(&self, genre: &str, offset: u32) -> Result<PlaylistPage> {
        load_page(self.fetcher.as_ref(), &self.state, genre, offset).await
    }

    pub fn reset_for_new_genre(&self) {
        let mut state = self.state.lock();
        state.genre = None;
        state.page = PlaylistPage::default();
        state.cursor = 0;
        state.offset = 0;
    }

    /// Returns the URI of the next playlist on the current page.
    ///
    /// Must be called from within a Tokio runtime: exhausting the page spawns
    /// the refill task.
    pub fn next(&self) -> Result<String> {
        let (uri, refill) = {
            let mut state = self.state.lock();
            let uri = state
                .page
                .get(state.cursor)
                .map(|entry| entry.uri.clone())
                .ok_or(AppError::EmptyPage)?;

            state.cursor += 1;
            state.offset += 1;

            let refill = if state.cursor >= state.page.len() {
                state.cursor = 0;
                state.genre.clone().map(|genre| (genre, state.offset))
            } else {
                None
            };

            (uri, refill)
        };

        if let Some((genre, offset)) = refill {
            self.spawn_refill(genre, offset);
        }

        Ok(uri)
    }

    /// Waits for the most recent background refill, if one is pending.
    pub async fn settle(&self) {
        let handle = self.refill.lock().take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Playlist refill task did not complete: {}", e);
            }
        }
    }

    pub fn cursor(&self) -> usize {
        self.state.lock().cursor
    }

    pub fn offset(&self) -> u32 {
        self.state.lock().offset
    }

    pub fn page(&self) -> PlaylistPage {
        self.state.lock().page.clone()
    }

    pub fn genre(&self) -> Option<String> {
        self.state.lock().genre.clone()
    }

    fn spawn_refill(&self, genre: String, offset: u32) {
        debug!("Playlists exhausted, fetching {} at offset {}", genre, offset);

        let fetcher = Arc::clone(&self.fetcher);
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            if let Err(e) = load_page(fetcher.as_ref(), &state, &genre, offset).await {
                warn!("Failed to refill playlists for {}: {}", genre, e);
            }
        });

        // An older refill keeps running detached; only the newest is tracked.
        *self.refill.lock() = Some(handle);
    }
}

async fn load_page<F: PlaylistFetcher>(
    fetcher: &F,
    state: &Mutex<RotationState>,
    genre: &str,
    offset: u32,
) -> Result<PlaylistPage> {
    let page = fetcher.fetch_playlists(genre, offset).await?;

    info!(
        "Loaded {} playlists for {} (offset {})",
        page.len(),
        genre,
        offset
    );

    let mut state = state.lock();
    state.genre = Some(genre.to_string());
    state.page = page.clone();
    state.cursor = 0;

    Ok(page)
}
