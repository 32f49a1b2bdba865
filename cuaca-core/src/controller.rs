//! Selection state for a home screen: which city is picked and the weather
//! currently on display for it.
//!
//! Every [`WeatherController::select`] starts a new generation. A fetch only
//! commits its results if its generation is still the current one, so results
//! of a superseded selection never reach the display, whatever order the
//! network calls finish in.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    model::{City, CurrentWeatherSummary, ForecastEntry},
    provider::WeatherProvider,
};

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastState {
    Loading,
    /// Entries as returned by the provider. Empty means the provider had none.
    Loaded(Vec<ForecastEntry>),
    /// The fetch failed; carries the reason.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HomeState {
    pub selected: City,
    pub generation: u64,
    pub current: CurrentWeatherSummary,
    pub forecast: ForecastState,
}

impl HomeState {
    fn loading(selected: City, generation: u64) -> Self {
        Self {
            selected,
            generation,
            current: CurrentWeatherSummary::loading(),
            forecast: ForecastState::Loading,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.forecast == ForecastState::Loading
    }
}

#[derive(Debug)]
pub struct WeatherController<P> {
    provider: Arc<P>,
    state: Arc<watch::Sender<HomeState>>,
}

impl<P: WeatherProvider + 'static> WeatherController<P> {
    /// Create a controller showing `initial` as loading. Nothing is fetched
    /// until [`select`](Self::select) or [`refresh`](Self::refresh) is called.
    pub fn new(provider: P, initial: City) -> Self {
        let (state, _) = watch::channel(HomeState::loading(initial, 0));
        Self { provider: Arc::new(provider), state: Arc::new(state) }
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> HomeState {
        self.state.borrow().clone()
    }

    /// Switch to `city` and fetch its weather in the background.
    ///
    /// Both fetches run concurrently and are committed together once both have
    /// finished. The returned handle completes after the commit (or discard).
    pub fn select(&self, city: City) -> JoinHandle<()> {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = state.generation + 1;
            *state = HomeState::loading(city, generation);
        });

        let provider = Arc::clone(&self.provider);
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            tracing::debug!(%city, generation, "Fetching weather");

            let (current, forecast) =
                tokio::join!(provider.current_weather(city), provider.try_forecast(city));

            let forecast = match forecast {
                Ok(entries) => ForecastState::Loaded(entries),
                Err(err) => {
                    tracing::warn!(%city, error = %err, "Forecast fetch failed");
                    ForecastState::Unavailable(err.to_string())
                }
            };

            let committed = state.send_if_modified(|state| {
                if state.generation != generation {
                    return false;
                }
                state.current = current;
                state.forecast = forecast;
                true
            });

            if !committed {
                tracing::debug!(%city, generation, "Discarding superseded weather result");
            }
        })
    }

    /// Fetch the currently selected city again.
    pub fn refresh(&self) -> JoinHandle<()> {
        let city = self.state.borrow().selected;
        self.select(city)
    }
}
