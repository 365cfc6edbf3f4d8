//! EasyPlay Weather
//!
//! HTTP client for the geocoding and forecast services behind weather
//! panels and the corner weather overlay.
//!
//! # Features
//!
//! - **Geocoding**: place name to coordinates, first match only
//! - **Forecast**: 5-day daily summary (weather code, max/min temperature)
//! - **Current conditions**: temperature and weather code for overlays
//! - **Glyphs**: fixed WMO code to glyph table with an explicit fallback
//!
//! # Example
//!
//! ```ignore
//! use easyplay_weather::{weather_glyph, WeatherClient, WeatherConfig};
//! use easyplay_core::TemperatureUnit;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WeatherClient::new(WeatherConfig::default())?;
//!     let forecast = client.forecast("São Paulo", TemperatureUnit::Celsius).await?;
//!     for day in &forecast.days {
//!         println!("{} {} {}/{}", day.date, weather_glyph(day.weather_code), day.max, day.min);
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod icons;
mod types;

pub use client::{ForecastProvider, WeatherClient, FORECAST_DAYS};
pub use error::{Result, WeatherError};
pub use icons::{weather_glyph, FALLBACK_GLYPH};
pub use types::{
    CurrentConditions, DailyForecast, Forecast, Location, WeatherConfig, DEFAULT_FORECAST_URL,
    DEFAULT_GEOCODING_URL,
};
