use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::spotify::models::{AuthHeader, PlaylistEntry, PlaylistPage};
use crate::spotify::rotator::PlaylistFetcher;
use crate::spotify::token::{AuthDecision, ProxyTokenSource, TokenManager, TokenSource};

#[derive(Debug, Deserialize)]
struct CategoryPlaylistsResponse {
    playlists: PlaylistsPaging,
}

#[derive(Debug, Deserialize)]
struct PlaylistsPaging {
    // Spotify occasionally returns null entries in category listings.
    items: Vec<Option<SpotifyApiPlaylist>>,
}

#[derive(Debug, Deserialize)]
struct SpotifyApiPlaylist {
    id: String,
    uri: String,
}

/// Spotify Web API client for category playlist searches.
pub struct SpotifyClient<S = ProxyTokenSource> {
    http_client: Client,
    api_base: String,
    limit: u32,
    tokens: Arc<TokenManager<S>>,
}

impl SpotifyClient {
    pub fn new(config: &Config) -> Self {
        let http_client = Client::new();
        let tokens = Arc::new(TokenManager::new(ProxyTokenSource::new(
            http_client.clone(),
            config,
        )));

        Self::with_tokens(http_client, config, tokens)
    }
}

impl<S: TokenSource> SpotifyClient<S> {
    pub fn with_tokens(http_client: Client, config: &Config, tokens: Arc<TokenManager<S>>) -> Self {
        Self {
            http_client,
            api_base: config.spotify_api_base.trim_end_matches('/').to_string(),
            limit: config.playlist_limit,
            tokens,
        }
    }

    pub fn tokens(&self) -> &Arc<TokenManager<S>> {
        &self.tokens
    }

    /// Fetches one page of playlists for a browse category.
    ///
    /// A 401 triggers a token refresh and a single retry. If the retried
    /// request fails too, that failure is returned as an API error.
    pub async fn get_category_playlists(&self, genre: &str, offset: u32) -> Result<PlaylistPage> {
        let header = self.tokens.ensure_authorized().await?;

        let err = match self.request_playlists(&header, genre, offset).await {
            Ok(page) => return Ok(page),
            Err(err) => err,
        };

        match self.tokens.handle_auth_error(&err).await? {
            AuthDecision::Retry => {
                let header = self
                    .tokens
                    .current_header()
                    .ok_or_else(|| AppError::Auth("No token after refresh".into()))?;

                debug!("Retrying {} playlists with refreshed token", genre);
                self.request_playlists(&header, genre, offset)
                    .await
                    .map_err(|e| match e {
                        AppError::AuthExpired => AppError::SpotifyApi {
                            status: StatusCode::UNAUTHORIZED.as_u16(),
                            message: "Token rejected again after refresh".into(),
                        },
                        other => other,
                    })
            }
            AuthDecision::Fatal(_) => Err(err),
        }
    }

    async fn request_playlists(
        &self,
        header: &AuthHeader,
        genre: &str,
        offset: u32,
    ) -> Result<PlaylistPage> {
        let url = format!(
            "{}/browse/categories/{}/playlists",
            self.api_base,
            urlencoding::encode(genre)
        );

        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, header.value())
            .query(&[("limit", self.limit), ("offset", offset)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AppError::AuthExpired);
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::SpotifyApi {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: CategoryPlaylistsResponse = response.json().await?;
        let total = body.playlists.items.len();

        let page: PlaylistPage = body
            .playlists
            .items
            .into_iter()
            .flatten()
            .map(|p| PlaylistEntry::new(p.id, p.uri))
            .collect();

        if page.len() < total {
            warn!("Skipped {} empty playlist entries", total - page.len());
        }

        Ok(page)
    }
}

#[async_trait]
impl<S: TokenSource + 'static> PlaylistFetcher for SpotifyClient<S> {
    async fn fetch_playlists(&self, genre: &str, offset: u32) -> Result<PlaylistPage> {
        self.get_category_playlists(genre, offset).await
    }
}
