use serde::{Deserialize, Serialize};

/// Icon shown whenever the provider could not be reached or understood.
pub const FALLBACK_ICON: &str = "01d";

/// Placeholder text before the first fetch for a city completes.
pub const LOADING_TEXT: &str = "Loading cuaca saat ini...";

/// Cities offered for selection. The first entry is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum City {
    #[default]
    Jakarta,
    Bandung,
    Surabaya,
    Medan,
    Denpasar,
}

impl City {
    pub fn as_str(&self) -> &'static str {
        match self {
            City::Jakarta => "Jakarta",
            City::Bandung => "Bandung",
            City::Surabaya => "Surabaya",
            City::Medan => "Medan",
            City::Denpasar => "Denpasar",
        }
    }

    pub const fn all() -> &'static [City] {
        &[City::Jakarta, City::Bandung, City::Surabaya, City::Medan, City::Denpasar]
    }
}

impl std::fmt::Display for City {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for City {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        City::all()
            .iter()
            .copied()
            .find(|city| city.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| {
                let supported: Vec<&str> = City::all().iter().map(City::as_str).collect();
                anyhow::anyhow!(
                    "Unknown city '{value}'. Supported cities: {}.",
                    supported.join(", ")
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeatherSummary {
    pub display_text: String,
    pub icon_code: String,
}

impl CurrentWeatherSummary {
    pub fn loading() -> Self {
        Self::degraded(LOADING_TEXT)
    }

    /// Placeholder summary carrying the fallback icon.
    pub fn degraded(text: impl Into<String>) -> Self {
        Self { display_text: text.into(), icon_code: FALLBACK_ICON.to_string() }
    }
}

/// One 3-hour slot of the 5-day forecast, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub formatted_timestamp: String,
    pub temperature_c: f64,
    pub condition: String,
    pub icon_code: String,
}

/// URL of the provider-hosted pictogram for an icon code.
pub fn icon_url(icon_code: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon_code}@2x.png")
}
