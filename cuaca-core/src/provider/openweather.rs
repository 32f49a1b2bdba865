use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    config::HttpConfig,
    error::FetchError,
    format::{format_celsius, format_timestamp},
    model::{City, CurrentWeatherSummary, ForecastEntry},
};

use super::WeatherProvider;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, http_config: &HttpConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(http_config.connect_timeout())
            .read_timeout(http_config.read_timeout());
        if !http_config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            api_key,
            base_url: http_config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn get(&self, endpoint: &str, city: City) -> Result<String, FetchError> {
        let url = format!("{}/{endpoint}", self.base_url);
        tracing::debug!(%city, endpoint, "Requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::status(status.as_u16(), &body));
        }

        Ok(body)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn try_current_weather(&self, city: City) -> Result<CurrentWeatherSummary, FetchError> {
        let body = self.get("weather", city).await?;
        parse_current(city, &body)
    }

    async fn try_forecast(&self, city: City) -> Result<Vec<ForecastEntry>, FetchError> {
        let body = self.get("forecast", city).await?;
        let entries = parse_forecast(&body)?;
        tracing::debug!(%city, entries = entries.len(), "Parsed OpenWeather forecast");
        Ok(entries)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: Option<String>,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt_txt: String,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

fn parse_current(city: City, body: &str) -> Result<CurrentWeatherSummary, FetchError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;

    let weather = parsed.weather.first().ok_or(FetchError::MissingField("weather[0]"))?;
    let description = weather
        .description
        .as_deref()
        .ok_or(FetchError::MissingField("weather[0].description"))?;

    Ok(CurrentWeatherSummary {
        display_text: format!(
            "Cuaca di {city}: {} ({description}), suhu: {}°C",
            weather.main,
            format_celsius(parsed.main.temp),
        ),
        icon_code: weather.icon.clone(),
    })
}

fn parse_forecast(body: &str) -> Result<Vec<ForecastEntry>, FetchError> {
    let parsed: OwForecastResponse = serde_json::from_str(body)?;

    parsed
        .list
        .into_iter()
        .map(|entry| {
            let weather = entry
                .weather
                .into_iter()
                .next()
                .ok_or(FetchError::MissingField("list[].weather[0]"))?;

            Ok(ForecastEntry {
                formatted_timestamp: format_timestamp(&entry.dt_txt),
                temperature_c: entry.main.temp,
                condition: weather.main,
                icon_code: weather.icon,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FALLBACK_ICON;
    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
        task::JoinHandle,
    };

    const JAKARTA_CURRENT: &str =
        r#"{"weather":[{"main":"Clouds","description":"few clouds","icon":"02d"}],"main":{"temp":29.5}}"#;

    const FORECAST: &str = r#"{
        "cod": "200",
        "list": [
            {"dt_txt": "2024-05-01 12:00:00", "main": {"temp": 31.2}, "weather": [{"main": "Rain", "description": "light rain", "icon": "10d"}]},
            {"dt_txt": "2024-05-01 15:00:00", "main": {"temp": 30}, "weather": [{"main": "Clouds", "icon": "03d"}]},
            {"dt_txt": "not a date", "main": {"temp": 27.8}, "weather": [{"main": "Clear", "icon": "01n"}]}
        ]
    }"#;

    /// Answer exactly one HTTP request with `status` and `body`. The handle
    /// yields the request line that was received.
    async fn serve_once(status: u16, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = Vec::new();
            let mut chunk = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.expect("read");
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..n]);
            }

            let response = format!(
                "HTTP/1.1 {status} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write");
            let _ = socket.shutdown().await;

            String::from_utf8_lossy(&request).lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{addr}"), handle)
    }

    fn provider(base_url: String) -> OpenWeatherProvider {
        let http = HttpConfig { base_url, use_system_proxy: false, ..HttpConfig::default() };
        OpenWeatherProvider::new("KEY".to_string(), &http).expect("client builds")
    }

    #[test]
    fn parse_current_matches_scenario() {
        let summary = parse_current(City::Jakarta, JAKARTA_CURRENT).unwrap();
        assert_eq!(summary.display_text, "Cuaca di Jakarta: Clouds (few clouds), suhu: 29.5°C");
        assert_eq!(summary.icon_code, "02d");
    }

    #[test]
    fn parse_current_rejects_missing_weather_array() {
        let err = parse_current(City::Medan, r#"{"main":{"temp":20.0}}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn parse_current_rejects_empty_weather_array() {
        let err = parse_current(City::Medan, r#"{"weather":[],"main":{"temp":20.0}}"#).unwrap_err();
        assert!(matches!(err, FetchError::MissingField("weather[0]")));
    }

    #[test]
    fn parse_forecast_preserves_order_and_length() {
        let entries = parse_forecast(FORECAST).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].formatted_timestamp, "Wed, 01 May 12:00");
        assert_eq!(entries[0].temperature_c, 31.2);
        assert_eq!(entries[0].condition, "Rain");
        assert_eq!(entries[0].icon_code, "10d");

        assert_eq!(entries[1].formatted_timestamp, "Wed, 01 May 15:00");
        assert_eq!(entries[1].temperature_c, 30.0);
        assert_eq!(entries[1].condition, "Clouds");

        assert_eq!(entries[2].formatted_timestamp, "not a date");
        assert_eq!(entries[2].icon_code, "01n");
    }

    #[test]
    fn parse_forecast_empty_list_is_ok() {
        assert!(parse_forecast(r#"{"list":[]}"#).unwrap().is_empty());
    }

    #[test]
    fn parse_forecast_fails_when_an_entry_has_no_weather() {
        let body = r#"{"list":[{"dt_txt":"2024-05-01 12:00:00","main":{"temp":1.0},"weather":[]}]}"#;
        assert!(parse_forecast(body).is_err());
    }

    #[tokio::test]
    async fn current_weather_success_builds_request_and_summary() {
        let (base, server) = serve_once(200, JAKARTA_CURRENT).await;

        let summary = provider(base).current_weather(City::Jakarta).await;

        assert_eq!(summary.display_text, "Cuaca di Jakarta: Clouds (few clouds), suhu: 29.5°C");
        assert_eq!(summary.icon_code, "02d");

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /weather?q=Jakarta&appid=KEY&units=metric "));
    }

    #[tokio::test]
    async fn current_weather_non_success_is_recovered() {
        let (base, _server) =
            serve_once(401, r#"{"cod":401,"message":"Invalid API key"}"#).await;

        let summary = provider(base).current_weather(City::Bandung).await;

        assert_eq!(summary.icon_code, FALLBACK_ICON);
        assert!(summary.display_text.starts_with("Error response: 401\n"));
        assert!(summary.display_text.contains("Invalid API key"));
    }

    #[tokio::test]
    async fn current_weather_malformed_json_is_recovered() {
        let (base, _server) = serve_once(200, r#"{"main":{"temp":20.0}}"#).await;

        let summary = provider(base).current_weather(City::Surabaya).await;

        assert_eq!(summary.icon_code, FALLBACK_ICON);
        assert!(summary.display_text.starts_with("Terjadi kesalahan: "));
    }

    #[tokio::test]
    async fn current_weather_transport_failure_is_recovered() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let summary = provider(format!("http://{addr}")).current_weather(City::Medan).await;

        assert_eq!(summary.icon_code, FALLBACK_ICON);
        assert!(summary.display_text.starts_with("Terjadi kesalahan: "));
    }

    #[tokio::test]
    async fn read_timeout_is_a_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_secs(5)).await;
            drop(socket);
        });

        let http = HttpConfig {
            base_url: format!("http://{addr}"),
            read_timeout_secs: 1,
            use_system_proxy: false,
            ..HttpConfig::default()
        };
        let provider = OpenWeatherProvider::new("KEY".into(), &http).unwrap();

        let err = provider.try_current_weather(City::Jakarta).await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn forecast_success_maps_every_entry() {
        let (base, server) = serve_once(200, FORECAST).await;

        let entries = provider(base).forecast(City::Denpasar).await;

        let stamps: Vec<&str> = entries.iter().map(|e| e.formatted_timestamp.as_str()).collect();
        assert_eq!(stamps, ["Wed, 01 May 12:00", "Wed, 01 May 15:00", "not a date"]);

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /forecast?q=Denpasar&appid=KEY&units=metric "));
    }

    #[tokio::test]
    async fn forecast_non_success_is_empty() {
        let (base, _server) = serve_once(404, r#"{"cod":"404","message":"city not found"}"#).await;

        assert!(provider(base).forecast(City::Jakarta).await.is_empty());
    }

    #[tokio::test]
    async fn forecast_failure_is_visible_through_try_variant() {
        let (base, _server) = serve_once(500, "boom").await;

        let err = provider(base).try_forecast(City::Jakarta).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { code: 500, .. }));
    }
}
