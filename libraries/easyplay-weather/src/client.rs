//! Weather service client.

use crate::error::{Result, WeatherError};
use crate::types::{
    CurrentConditions, CurrentResponse, DailyForecast, Forecast, ForecastResponse,
    GeocodeResponse, Location, WeatherConfig,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use easyplay_core::TemperatureUnit;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Number of days shown by weather panels
pub const FORECAST_DAYS: u8 = 5;

/// Source of multi-day forecasts.
///
/// The playback crate renders weather panels through this trait so hosts
/// and tests can swap the HTTP client out.
#[async_trait]
pub trait ForecastProvider: Send + Sync {
    /// Resolve `location` and fetch its daily forecast.
    async fn daily_forecast(&self, location: &str, unit: TemperatureUnit) -> Result<Forecast>;
}

/// Client for the geocoding and forecast services.
///
/// # Example
///
/// ```ignore
/// use easyplay_weather::{WeatherClient, WeatherConfig};
/// use easyplay_core::TemperatureUnit;
///
/// let client = WeatherClient::new(WeatherConfig::default())?;
/// let forecast = client.forecast("Lisboa", TemperatureUnit::Celsius).await?;
/// println!("{}: {} days", forecast.place, forecast.days.len());
/// ```
#[derive(Debug, Clone)]
pub struct WeatherClient {
    http: Client,
    geocoding_url: String,
    forecast_url: String,
    language: String,
}

impl WeatherClient {
    /// Create a new client with the given configuration.
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let geocoding_url = normalize_base(&config.geocoding_url)?;
        let forecast_url = normalize_base(&config.forecast_url)?;

        let http = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("EasyPlay/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            geocoding_url,
            forecast_url,
            language: config.language,
        })
    }

    /// Resolve a place name to coordinates (first match only).
    pub async fn geocode(&self, name: &str) -> Result<Location> {
        let url = format!("{}/v1/search", self.geocoding_url);
        debug!(location = %name, "Geocoding location");

        let response = self
            .send(self.http.get(&url).query(&[
                ("name", name),
                ("count", "1"),
                ("language", self.language.as_str()),
                ("format", "json"),
            ]))
            .await?;
        let body: GeocodeResponse = parse_json(response).await?;

        body.results
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| {
                warn!(location = %name, "Weather location not found");
                WeatherError::LocationNotFound(name.to_string())
            })
    }

    /// Daily forecast (weather code, max/min temperature) for a location.
    pub async fn forecast(&self, name: &str, unit: TemperatureUnit) -> Result<Forecast> {
        let location = self.geocode(name).await?;
        let days = FORECAST_DAYS.to_string();
        let mut query = coordinates(&location);
        query.extend([
            (
                "daily",
                "weather_code,temperature_2m_max,temperature_2m_min".to_string(),
            ),
            ("timezone", "auto".to_string()),
            ("forecast_days", days),
        ]);
        push_unit(&mut query, unit);

        let url = format!("{}/v1/forecast", self.forecast_url);
        let response = self.send(self.http.get(&url).query(&query)).await?;
        let body: ForecastResponse = parse_json(response).await?;
        let forecast = build_forecast(location.name, body)?;

        info!(
            place = %forecast.place,
            days = forecast.days.len(),
            "Fetched weather forecast"
        );
        Ok(forecast)
    }

    /// Current temperature and weather code for a location.
    pub async fn current_conditions(
        &self,
        name: &str,
        unit: TemperatureUnit,
    ) -> Result<CurrentConditions> {
        let location = self.geocode(name).await?;
        let mut query = coordinates(&location);
        query.extend([
            ("current", "temperature_2m,weather_code".to_string()),
            ("timezone", "auto".to_string()),
            ("forecast_days", "1".to_string()),
        ]);
        push_unit(&mut query, unit);

        let url = format!("{}/v1/forecast", self.forecast_url);
        let response = self.send(self.http.get(&url).query(&query)).await?;
        let body: CurrentResponse = parse_json(response).await?;

        Ok(CurrentConditions {
            place: location.name,
            temperature: round_half_up(body.current.temperature_2m),
            temperature_unit: body.current_units.temperature_2m,
            weather_code: body.current.weather_code,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                WeatherError::ServiceUnreachable(e.to_string())
            } else {
                WeatherError::Request(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(WeatherError::ServiceError {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl ForecastProvider for WeatherClient {
    async fn daily_forecast(&self, location: &str, unit: TemperatureUnit) -> Result<Forecast> {
        self.forecast(location, unit).await
    }
}

fn normalize_base(raw: &str) -> Result<String> {
    let trimmed = raw.trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| WeatherError::InvalidUrl(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(WeatherError::InvalidUrl(
            "URL must start with http:// or https://".into(),
        ));
    }
    Ok(trimmed.to_string())
}

fn coordinates(location: &Location) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", location.latitude.to_string()),
        ("longitude", location.longitude.to_string()),
    ]
}

fn push_unit(query: &mut Vec<(&'static str, String)>, unit: TemperatureUnit) {
    if unit == TemperatureUnit::Fahrenheit {
        query.push(("temperature_unit", "fahrenheit".to_string()));
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| WeatherError::ParseError(e.to_string()))
}

fn build_forecast(place: String, body: ForecastResponse) -> Result<Forecast> {
    let daily = body.daily;
    let len = daily.time.len();
    if daily.weather_code.len() != len
        || daily.temperature_2m_max.len() != len
        || daily.temperature_2m_min.len() != len
    {
        return Err(WeatherError::ParseError(
            "daily series have mismatched lengths".to_string(),
        ));
    }

    let days = daily
        .time
        .iter()
        .enumerate()
        .map(|(i, time)| {
            let date = NaiveDate::parse_from_str(time, "%Y-%m-%d")
                .map_err(|e| WeatherError::ParseError(format!("bad date {time:?}: {e}")))?;
            Ok(DailyForecast {
                date,
                weather_code: daily.weather_code[i],
                max: round_half_up(daily.temperature_2m_max[i]),
                min: round_half_up(daily.temperature_2m_min[i]),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Forecast {
        place,
        temperature_unit: body.daily_units.temperature_2m_max,
        days,
    })
}

/// Round with halves toward positive infinity (-2.5 becomes -2).
fn round_half_up(value: f64) -> i32 {
    (value + 0.5).floor() as i32
}
