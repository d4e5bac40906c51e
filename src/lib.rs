pub mod config;
pub mod error;
pub mod foursquare;
pub mod genre;
pub mod session;
pub mod spotify;

pub use config::Config;
pub use error::{AppError, Result};
pub use foursquare::{CoffeeShop, FoursquareClient, LatLng, Location, VenueSearch};
pub use session::{Effect, Event, Session};
pub use spotify::{
    AuthDecision, AuthHeader, PlaylistFetcher, PlaylistPage, PlaylistRotator, SpotifyClient,
    TokenManager,
};
