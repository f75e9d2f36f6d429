//! OpenWeatherMap current-weather client.

use crate::{LookupError, Result, LOOKUP_TIMEOUT};
use serde::Deserialize;

const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org";

#[derive(Debug, Deserialize)]
struct WeatherResponse {
    weather: Vec<Condition>,
    main: MainMetrics,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainMetrics {
    temp: f64,
}

/// Client for the OpenWeatherMap current-weather endpoint.
pub struct WeatherClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl WeatherClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: OPENWEATHER_BASE_URL.to_string(),
        }
    }

    /// Override the base URL (used by tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetch the current weather for a city, in metric units.
    ///
    /// Returns a sentence embedding the first weather-condition description
    /// and the temperature in Celsius. The caller is expected to pass
    /// non-empty `city` and `country_code`; their format is left to the
    /// upstream service to validate.
    pub async fn current(&self, city: &str, country_code: &str) -> Result<String> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let place = format!("{city},{country_code}");
        tracing::debug!(%city, %country_code, "fetching current weather");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", place.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await
            .map_err(|e| LookupError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Status { status, body });
        }

        let data: WeatherResponse = response
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        let condition = data
            .weather
            .first()
            .ok_or_else(|| LookupError::Malformed("no weather conditions in response".into()))?;

        Ok(format!(
            "The weather in {city}, {country_code} is {} with a temperature of {} C.",
            condition.description, data.main.temp
        ))
    }
}
