use serde::Serialize;

use crate::foursquare::{CoffeeShop, LatLng, Location};

/// Map centre used before the user picks a place (downtown Toronto).
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 43.6532,
    lng: -79.3832,
};
pub const MAP_ZOOM: u8 = 13;

/// Everything the page remembers between events. Playlist rotation and the
/// Spotify token live in their own components.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub location: Option<Location>,
    pub genre: Option<String>,
    pub coffee_shops: Vec<CoffeeShop>,
    pub results_showing: bool,
}

impl AppState {
    pub fn center(&self) -> LatLng {
        self.location
            .as_ref()
            .map(|l| l.position)
            .unwrap_or(DEFAULT_CENTER)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A place was picked from the search box.
    PlaceSelected(Location),
    SubmitLocation,
    GenreChosen(String),
    SubmitMusic,
    Reload,
    NewPlaylist,
    ChangeMusic,
    ChangeLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Landing,
    Music,
    Results,
}

/// Something the front-end should show in response to an event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    Notice {
        title: String,
        text: String,
    },
    MapTitle {
        text: String,
    },
    GenreSelected {
        genre: String,
    },
    ShowMusic,
    ShowResults,
    ScrollTo {
        section: Section,
    },
    ShowLoading,
    HideLoading,
    LoadFailed {
        reason: String,
    },
    ClearMap,
    RenderMap {
        center: LatLng,
        zoom: u8,
        shops: Vec<CoffeeShop>,
    },
    EmbedPlaylist {
        uri: String,
        src: String,
    },
}

impl Effect {
    pub fn scroll_to(section: Section) -> Self {
        Effect::ScrollTo { section }
    }
}
