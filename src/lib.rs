pub mod config;
pub mod credentials;
pub mod error;
pub mod pipeline;
pub mod routes;
pub mod state;
pub mod strava;
pub mod types;
