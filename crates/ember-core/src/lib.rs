//! Shared building blocks for the Ember map client: geospatial math and
//! environment-driven application configuration.

pub mod app_config;
pub mod config;
pub mod geo;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{Coordinate, CoordinateSpan, Region, ScreenPoint, ViewportSize};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
