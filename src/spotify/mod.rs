pub mod client;
pub mod embed;
pub mod models;
pub mod rotator;
pub mod token;

pub use client::SpotifyClient;
pub use embed::embed_url;
pub use models::{AuthHeader, PlaylistEntry, PlaylistPage, TokenResponse};
pub use rotator::{PlaylistFetcher, PlaylistRotator};
pub use token::{AuthDecision, AuthState, ProxyTokenSource, TokenManager, TokenSource};
