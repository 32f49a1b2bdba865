use std::fmt::Write;

use chrono::NaiveDateTime;
use cuaca_core::{ForecastState, HomeState, format::format_celsius, icon_url};

/// Text rendition of the home screen for `state`.
pub fn render_home(state: &HomeState, fetched_at: NaiveDateTime) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Forecast Weather");
    let _ = writeln!(out, "Kota: {}", state.selected);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", state.current.display_text);
    let _ = writeln!(out, "  {}", icon_url(&state.current.icon_code));
    let _ = writeln!(out);
    let _ = writeln!(out, "Forecast 5 hari (3 jam sekali):");

    match &state.forecast {
        ForecastState::Loading => {
            let _ = writeln!(out, "  Loading...");
        }
        ForecastState::Loaded(entries) if entries.is_empty() => {
            let _ = writeln!(out, "  Tidak ada data forecast");
        }
        ForecastState::Loaded(entries) => {
            for entry in entries {
                let temp = format!("{}°C", format_celsius(entry.temperature_c));
                let _ = writeln!(
                    out,
                    "  {:<18} {:>8}  {:<12} [{}]",
                    entry.formatted_timestamp, temp, entry.condition, entry.icon_code
                );
            }
        }
        ForecastState::Unavailable(reason) => {
            let _ = writeln!(out, "  Tidak ada data forecast ({})", reason.replace('\n', " "));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Diperbarui: {}", fetched_at.format("%H:%M:%S"));

    out
}
