//! Display helpers for provider values.

use chrono::NaiveDateTime;

/// Layout of the provider's `dt_txt` field (local time of the city).
pub const PROVIDER_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S";

/// Compact layout used in forecast rows, e.g. `Wed, 01 May 12:00`.
pub const DISPLAY_TIMESTAMP: &str = "%a, %d %b %H:%M";

/// Reformat a `dt_txt` value for display. Input that does not parse is
/// returned unchanged so the entry is still shown.
pub fn format_timestamp(raw: &str) -> String {
    match NaiveDateTime::parse_from_str(raw, PROVIDER_TIMESTAMP) {
        Ok(dt) => dt.format(DISPLAY_TIMESTAMP).to_string(),
        Err(err) => {
            tracing::debug!(raw, %err, "Unparseable forecast timestamp, passing through");
            raw.to_string()
        }
    }
}

/// Render a temperature the way the provider's numbers read: whole values keep
/// one decimal (`30.0`), everything else uses the shortest exact form (`29.5`).
pub fn format_celsius(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e7 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
