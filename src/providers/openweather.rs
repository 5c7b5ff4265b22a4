use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dispatch::http::HttpDispatch;
use crate::error::ProviderError;

pub const OPENWEATHER_PROVIDER: &str = "openweather";

#[derive(Debug, Clone, PartialEq)]
pub enum WeatherLocation {
    City(String),
    Coords { lat: f64, lon: f64 },
}

#[derive(Deserialize)]
struct CurrentWeather {
    name: Option<String>,
    sys: Option<Sys>,
    main: Main,
    #[serde(default)]
    weather: Vec<Condition>,
    wind: Option<Wind>,
    clouds: Option<Clouds>,
}

#[derive(Deserialize)]
struct Sys {
    country: Option<String>,
}

#[derive(Deserialize)]
struct Main {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Deserialize)]
struct Condition {
    description: String,
    icon: Option<String>,
}

#[derive(Deserialize)]
struct Wind {
    speed: f64,
}

#[derive(Deserialize)]
struct Clouds {
    all: f64,
}

/// Current conditions, as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherReport {
    pub city: String,
    pub country: String,
    /// Whole degrees Celsius.
    pub temperature: i64,
    pub feels_like: i64,
    pub description: String,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    pub cloud_cover: f64,
    pub icon: Option<String>,
}

/// OpenWeatherMap current-weather client. Single provider, no chain.
pub struct WeatherClient {
    http: HttpDispatch,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl WeatherClient {
    pub fn new(http: HttpDispatch, base_url: &str, api_key: Option<String>, timeout: Duration) -> Self {
        Self {
            http,
            url: format!("{}/data/2.5/weather", base_url.trim_end_matches('/')),
            api_key,
            timeout,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn current(&self, location: &WeatherLocation) -> Result<WeatherReport, ProviderError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured {
                provider: OPENWEATHER_PROVIDER.to_string(),
            })?;

        let mut request = self
            .http
            .client()
            .get(&self.url)
            .query(&[("appid", key), ("units", "metric")]);
        request = match location {
            WeatherLocation::City(city) => request.query(&[("q", city.as_str())]),
            WeatherLocation::Coords { lat, lon } => {
                request.query(&[("lat", lat.to_string()), ("lon", lon.to_string())])
            }
        };

        let raw: CurrentWeather = self
            .http
            .execute_json(OPENWEATHER_PROVIDER, request, self.timeout)
            .await?;

        let condition = raw.weather.into_iter().next();
        Ok(WeatherReport {
            city: raw.name.unwrap_or_default(),
            country: raw.sys.and_then(|s| s.country).unwrap_or_default(),
            temperature: raw.main.temp.round() as i64,
            feels_like: raw.main.feels_like.round() as i64,
            description: condition
                .as_ref()
                .map(|c| c.description.clone())
                .unwrap_or_default(),
            humidity: raw.main.humidity,
            pressure: raw.main.pressure,
            wind_speed: raw.wind.map(|w| w.speed).unwrap_or_default(),
            cloud_cover: raw.clouds.map(|c| c.all).unwrap_or_default(),
            icon: condition.and_then(|c| c.icon),
        })
    }
}
