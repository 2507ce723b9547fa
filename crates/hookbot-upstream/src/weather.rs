//! OpenWeatherMap current-weather client.

use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use crate::error::{Result, UpstreamError};
use crate::http::{endpoint, read_json};

const SERVICE: &str = "OpenWeatherMap";

/// Offset between Kelvin and Celsius.
const KELVIN_OFFSET: f64 = 273.15;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MainReadings {
    /// Temperature in Kelvin.
    pub temp: f64,
    /// Relative humidity in percent.
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct Wind {
    /// Wind speed in metres per second.
    #[serde(default)]
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub description: String,
}

/// Response of `/data/2.5/weather`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CurrentWeather {
    /// City name as resolved by the API.
    #[serde(default)]
    pub name: String,
    pub main: MainReadings,
    #[serde(default)]
    pub wind: Wind,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

impl CurrentWeather {
    /// Temperature in degrees Celsius.
    pub fn celsius(&self) -> f64 {
        self.main.temp - KELVIN_OFFSET
    }

    /// First condition description, if any.
    pub fn description(&self) -> Option<&str> {
        self.weather.first().map(|c| c.description.as_str())
    }
}

/// OpenWeatherMap API client.
#[derive(Clone)]
pub struct OpenWeatherClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    lang: String,
}

impl OpenWeatherClient {
    /// Creates a client for the API rooted at `base_url`.
    pub fn new(
        client: reqwest::Client,
        base_url: Url,
        api_key: impl Into<String>,
        lang: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key: api_key.into(),
            lang: lang.into(),
        }
    }

    /// Fetches current weather for `city`.
    ///
    /// An unknown city yields [`UpstreamError::NotFound`].
    pub async fn current(&self, city: &str) -> Result<CurrentWeather> {
        let url = endpoint(&self.base_url, &["data", "2.5", "weather"])?;
        let response = self
            .client
            .get(url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(city, "City not found");
            return Err(UpstreamError::NotFound(city.to_string()));
        }
        read_json(SERVICE, response).await
    }
}
