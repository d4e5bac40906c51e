use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::foursquare::models::{CoffeeShop, LatLng};

const API_VERSION: &str = "20170930";
const SEARCH_QUERY: &str = "coffee";

/// Searches for coffee shops around a point.
#[async_trait]
pub trait VenueSearch: Send + Sync + 'static {
    async fn search_coffee_shops(&self, center: LatLng) -> Result<Vec<CoffeeShop>>;
}

#[derive(Debug, Deserialize)]
struct VenueSearchResponse {
    response: VenueSearchBody,
}

#[derive(Debug, Deserialize)]
struct VenueSearchBody {
    #[serde(default)]
    venues: Vec<FoursquareVenue>,
}

#[derive(Debug, Deserialize)]
struct FoursquareVenue {
    name: String,
    #[serde(default)]
    contact: FoursquareContact,
    location: FoursquareLocation,
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct FoursquareContact {
    #[serde(rename = "formattedPhone")]
    formatted_phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FoursquareLocation {
    address: Option<String>,
    lat: f64,
    lng: f64,
}

impl From<FoursquareVenue> for CoffeeShop {
    fn from(venue: FoursquareVenue) -> Self {
        Self {
            name: venue.name,
            phone: venue.contact.formatted_phone,
            address: venue.location.address,
            website: venue.url,
            location: LatLng::new(venue.location.lat, venue.location.lng),
        }
    }
}

pub struct FoursquareClient {
    http_client: Client,
    api_base: String,
    client_id: String,
    client_secret: String,
}

impl FoursquareClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(http_client: Client, config: &Config) -> Self {
        Self {
            http_client,
            api_base: config.foursquare_api_base.trim_end_matches('/').to_string(),
            client_id: config.foursquare_client_id.clone(),
            client_secret: config.foursquare_client_secret.clone(),
        }
    }
}

#[async_trait]
impl VenueSearch for FoursquareClient {
    async fn search_coffee_shops(&self, center: LatLng) -> Result<Vec<CoffeeShop>> {
        let url = format!("{}/venues/search", self.api_base);
        let ll = center.to_string();

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("format", "json"),
                ("v", API_VERSION),
                ("query", SEARCH_QUERY),
                ("ll", ll.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::FoursquareApi {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: VenueSearchResponse = response.json().await?;
        let shops: Vec<CoffeeShop> = body.response.venues.into_iter().map(Into::into).collect();

        info!("Found {} coffee shops near {}", shops.len(), center);
        Ok(shops)
    }
}
