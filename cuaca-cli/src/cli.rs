use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use cuaca_core::{City, Config, OpenWeatherProvider, WeatherController, provider_from_config};
use inquire::{InquireError, Password, PasswordDisplayMode, Select};

use crate::render::render_home;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cuaca", version, about = "Current weather and 5-day forecast for Indonesian cities")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// OpenWeatherMap API key; overrides the configured one.
    #[arg(long, global = true, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key and default city.
    Configure,

    /// List the cities that can be looked up.
    Cities,

    /// Show current weather and forecast for a city.
    Show {
        /// City name, e.g. "Bandung". Defaults to the configured city.
        city: Option<String>,
    },

    /// Pick cities interactively until cancelled (Esc / Ctrl-C).
    Browse,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Cities => {
                let default = config.default_city()?;
                for city in City::all() {
                    let marker = if *city == default { "*" } else { " " };
                    println!("{marker} {city}");
                }
                Ok(())
            }
            Command::Show { city } => {
                let city = match city {
                    Some(name) => City::try_from(name.as_str())?,
                    None => config.default_city()?,
                };
                let controller = controller(&config, self.api_key.as_deref(), city)?;

                controller.select(city).await.context("Weather fetch task failed")?;
                print!("{}", render_home(&controller.state(), Local::now().naive_local()));
                Ok(())
            }
            Command::Browse => {
                let mut city = config.default_city()?;
                let controller = controller(&config, self.api_key.as_deref(), city)?;

                loop {
                    let cursor = City::all().iter().position(|c| *c == city).unwrap_or(0);
                    let picked = Select::new("Pilih Kota:", City::all().to_vec())
                        .with_starting_cursor(cursor)
                        .prompt();

                    city = match picked {
                        Ok(city) => city,
                        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                            break;
                        }
                        Err(err) => return Err(err.into()),
                    };

                    controller.select(city).await.context("Weather fetch task failed")?;
                    println!("{}", render_home(&controller.state(), Local::now().naive_local()));
                }

                Ok(())
            }
        }
    }
}

fn controller(
    config: &Config,
    api_key: Option<&str>,
    city: City,
) -> anyhow::Result<WeatherController<OpenWeatherProvider>> {
    let provider = provider_from_config(config, api_key)?;
    Ok(WeatherController::new(provider, city))
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let api_key = Password::new("OpenWeatherMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    config.set_api_key(api_key);

    let current = config.default_city()?;
    let cursor = City::all().iter().position(|c| *c == current).unwrap_or(0);
    let city = Select::new("Default city:", City::all().to_vec())
        .with_starting_cursor(cursor)
        .prompt()?;
    config.set_default_city(city);

    let path = config.save()?;
    tracing::info!(path = %path.display(), "Saved configuration");
    println!("Configuration saved to {}", path.display());

    Ok(())
}
