// Library root for the astro REST API

pub mod auth;
pub mod chart;
pub mod config;
pub mod db;
pub mod ephemeris;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use chart::ChartCalculator;
pub use db::{Database, MemoryStore};
pub use error::ApiError;
pub use routes::{create_router, RouterSettings};
pub use state::AppState;
