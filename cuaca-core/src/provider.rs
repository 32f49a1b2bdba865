use crate::{
    Config, CurrentWeatherSummary, ForecastEntry, error::FetchError, model::City,
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Prefix of the placeholder text shown when a current-weather fetch fails.
pub const ERROR_PREFIX: &str = "Terjadi kesalahan";

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn try_current_weather(&self, city: City) -> Result<CurrentWeatherSummary, FetchError>;

    async fn try_forecast(&self, city: City) -> Result<Vec<ForecastEntry>, FetchError>;

    /// Current weather for `city`. Failures become a placeholder summary with
    /// the fallback icon.
    async fn current_weather(&self, city: City) -> CurrentWeatherSummary {
        match self.try_current_weather(city).await {
            Ok(summary) => summary,
            Err(err) => {
                tracing::warn!(%city, error = %err, "Current weather fetch failed");
                degraded_summary(&err)
            }
        }
    }

    /// Forecast for `city`. Failures become an empty list.
    async fn forecast(&self, city: City) -> Vec<ForecastEntry> {
        self.try_forecast(city).await.unwrap_or_else(|err| {
            tracing::warn!(%city, error = %err, "Forecast fetch failed");
            Vec::new()
        })
    }
}

/// Placeholder summary for a failed current-weather fetch.
pub fn degraded_summary(err: &FetchError) -> CurrentWeatherSummary {
    match err {
        FetchError::Status { .. } => CurrentWeatherSummary::degraded(err.to_string()),
        _ => CurrentWeatherSummary::degraded(format!("{ERROR_PREFIX}: {err}")),
    }
}

/// Construct the OpenWeather client from config. `api_key` overrides the
/// configured key when present.
pub fn provider_from_config(
    config: &Config,
    api_key: Option<&str>,
) -> anyhow::Result<OpenWeatherProvider> {
    let api_key = match api_key {
        Some(key) if !key.trim().is_empty() => key.trim(),
        _ => config.api_key()?,
    };

    OpenWeatherProvider::new(api_key.to_owned(), &config.http)
}
