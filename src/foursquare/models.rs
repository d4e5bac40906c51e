use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl std::fmt::Display for LatLng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// A place picked by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub position: LatLng,
    pub address: String,
    pub name: String,
}

impl Location {
    pub fn new(position: LatLng, address: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            position,
            address: address.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeeShop {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub website: Option<String>,
    pub location: LatLng,
}

#[cfg(test)]
impl CoffeeShop {
    pub fn mock(name: &str) -> Self {
        Self {
            name: name.to_string(),
            phone: Some("(416) 555-0100".to_string()),
            address: Some("1 Queen St W".to_string()),
            website: None,
            location: LatLng::new(43.6532, -79.3832),
        }
    }
}
