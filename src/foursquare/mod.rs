pub mod client;
pub mod models;

pub use client::{FoursquareClient, VenueSearch};
pub use models::{CoffeeShop, LatLng, Location};
