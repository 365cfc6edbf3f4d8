//! Multi-day forecast panel

use super::{ContentRenderer, RenderOutcome, RenderedItem, SkipReason};
use crate::surface::{Surface, SurfaceContent, WeatherDay, WeatherPanel};
use chrono::Datelike;
use easyplay_core::TemperatureUnit;
use easyplay_weather::{weather_glyph, Forecast};
use tracing::{debug, warn};

impl ContentRenderer {
    pub(super) async fn render_weather(&self, location: &str, unit: TemperatureUnit) -> RenderOutcome {
        let location = location.trim();
        if location.is_empty() {
            warn!("Weather item has no location");
            return RenderOutcome::Skip(SkipReason::NoSource);
        }

        match self.platform.forecasts.daily_forecast(location, unit).await {
            Ok(forecast) => {
                debug!(place = %forecast.place, days = forecast.days.len(), "Forecast loaded");
                RenderOutcome::Ready(RenderedItem::timed(Surface::new(SurfaceContent::Weather(
                    weather_panel(forecast),
                ))))
            }
            Err(e) => RenderOutcome::degraded(format!(
                "Could not load the weather for \"{location}\": {e}"
            )),
        }
    }
}

fn weather_panel(forecast: Forecast) -> WeatherPanel {
    WeatherPanel {
        place: forecast.place,
        unit: forecast.temperature_unit,
        days: forecast
            .days
            .into_iter()
            .map(|day| WeatherDay {
                date: day.date,
                weekday: day.date.weekday(),
                glyph: weather_glyph(day.weather_code),
                max: day.max,
                min: day.min,
            })
            .collect(),
    }
}
