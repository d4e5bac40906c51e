pub mod handler;
pub mod state;

pub use handler::Session;
pub use state::{AppState, DEFAULT_CENTER, Effect, Event, MAP_ZOOM, Section};
