use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_TOKEN_PROXY_URL: &str = "https://proxy.hackeryou.com";
pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
pub const DEFAULT_FOURSQUARE_API_BASE: &str = "https://api.foursquare.com/v2";
pub const DEFAULT_PLAYLIST_LIMIT: u32 = 10;
pub const DEFAULT_EMBED_THEME: &str = "white";

#[derive(Debug, Clone)]
pub struct Config {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    pub foursquare_client_id: String,
    pub foursquare_client_secret: String,
    pub token_proxy_url: String,
    pub spotify_auth_url: String,
    pub spotify_api_base: String,
    pub foursquare_api_base: String,
    pub playlist_limit: u32,
    pub embed_theme: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let spotify_client_id = std::env::var("SPOTIFY_CLIENT_ID")
            .map_err(|_| AppError::Config("SPOTIFY_CLIENT_ID not set".into()))?;

        let spotify_client_secret = std::env::var("SPOTIFY_CLIENT_SECRET")
            .map_err(|_| AppError::Config("SPOTIFY_CLIENT_SECRET not set".into()))?;

        let foursquare_client_id = std::env::var("FOURSQUARE_CLIENT_ID")
            .map_err(|_| AppError::Config("FOURSQUARE_CLIENT_ID not set".into()))?;

        let foursquare_client_secret = std::env::var("FOURSQUARE_CLIENT_SECRET")
            .map_err(|_| AppError::Config("FOURSQUARE_CLIENT_SECRET not set".into()))?;

        let playlist_limit = match std::env::var("SPOTIFY_PLAYLIST_LIMIT") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                AppError::Config(format!("SPOTIFY_PLAYLIST_LIMIT is not a number: {}", raw))
            })?,
            Err(_) => DEFAULT_PLAYLIST_LIMIT,
        };

        let config = Self {
            spotify_client_id,
            spotify_client_secret,
            foursquare_client_id,
            foursquare_client_secret,
            token_proxy_url: env_or("SPOTIFY_TOKEN_PROXY_URL", DEFAULT_TOKEN_PROXY_URL),
            spotify_auth_url: env_or("SPOTIFY_AUTH_URL", DEFAULT_SPOTIFY_AUTH_URL),
            spotify_api_base: env_or("SPOTIFY_API_BASE", DEFAULT_SPOTIFY_API_BASE),
            foursquare_api_base: env_or("FOURSQUARE_API_BASE", DEFAULT_FOURSQUARE_API_BASE),
            playlist_limit,
            embed_theme: env_or("SPOTIFY_EMBED_THEME", DEFAULT_EMBED_THEME),
        };

        config.validate_urls()?;
        Ok(config)
    }

    /// Configuration with the public endpoints and empty credentials.
    pub fn with_credentials(
        spotify_client_id: &str,
        spotify_client_secret: &str,
        foursquare_client_id: &str,
        foursquare_client_secret: &str,
    ) -> Self {
        Self {
            spotify_client_id: spotify_client_id.to_string(),
            spotify_client_secret: spotify_client_secret.to_string(),
            foursquare_client_id: foursquare_client_id.to_string(),
            foursquare_client_secret: foursquare_client_secret.to_string(),
            token_proxy_url: DEFAULT_TOKEN_PROXY_URL.to_string(),
            spotify_auth_url: DEFAULT_SPOTIFY_AUTH_URL.to_string(),
            spotify_api_base: DEFAULT_SPOTIFY_API_BASE.to_string(),
            foursquare_api_base: DEFAULT_FOURSQUARE_API_BASE.to_string(),
            playlist_limit: DEFAULT_PLAYLIST_LIMIT,
            embed_theme: DEFAULT_EMBED_THEME.to_string(),
        }
    }

    pub fn validate_urls(&self) -> Result<()> {
        let urls = [
            ("SPOTIFY_TOKEN_PROXY_URL", &self.token_proxy_url),
            ("SPOTIFY_AUTH_URL", &self.spotify_auth_url),
            ("SPOTIFY_API_BASE", &self.spotify_api_base),
            ("FOURSQUARE_API_BASE", &self.foursquare_api_base),
        ];

        for (name, value) in urls {
            Url::parse(value)
                .map_err(|e| AppError::Config(format!("{} is not a valid URL: {}", name, e)))?;
        }

        Ok(())
    }

    pub fn get_missing_config(&self) -> Vec<String> {
        let mut missing = Vec::new();

        if self.spotify_client_id.is_empty() {
            missing.push("SPOTIFY_CLIENT_ID".to_string());
        }
        if self.spotify_client_secret.is_empty() {
            missing.push("SPOTIFY_CLIENT_SECRET".to_string());
        }
        if self.foursquare_client_id.is_empty() {
            missing.push("FOURSQUARE_CLIENT_ID".to_string());
        }
        if self.foursquare_client_secret.is_empty() {
            missing.push("FOURSQUARE_CLIENT_SECRET".to_string());
        }

        missing
    }

    pub fn validate_spotify_config(&self) -> bool {
        !self.spotify_client_id.is_empty() && !self.spotify_client_secret.is_empty()
    }

    pub fn validate_foursquare_config(&self) -> bool {
        !self.foursquare_client_id.is_empty() && !self.foursquare_client_secret.is_empty()
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
