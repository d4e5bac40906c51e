use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Incomplete input: {0}")]
    IncompleteInput(String),

    #[error("Spotify access token expired or rejected")]
    AuthExpired,

    #[error("Spotify API error ({status}): {message}")]
    SpotifyApi { status: u16, message: String },

    #[error("Foursquare API error ({status}): {message}")]
    FoursquareApi { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("No playlists loaded for the current genre")]
    EmptyPage,

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// HTTP status carried by the error, if it came from an HTTP response.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::AuthExpired => Some(401),
            AppError::SpotifyApi { status, .. } | AppError::FoursquareApi { status, .. } => {
                Some(*status)
            }
            AppError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
