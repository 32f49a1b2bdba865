//! Core library for the `cuaca` weather lookup tool.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeatherMap client and forecast normalization
//! - A selection controller that keeps displayed results consistent
//! - Shared domain models (cities, summaries, forecast entries)
//!
//! It is used by `cuaca-cli`, but can also back other front ends.

pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod model;
pub mod provider;

pub use config::{Config, HttpConfig};
pub use controller::{ForecastState, HomeState, WeatherController};
pub use error::FetchError;
pub use model::{City, CurrentWeatherSummary, FALLBACK_ICON, ForecastEntry, icon_url};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_config};
