use crate::error::{Result, YoncaError};
use crate::models::CurrentConditions;
use serde::Deserialize;
use std::time::Duration;

/// Current conditions from the Open-Meteo forecast API.
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    current: Option<OpenMeteoCurrent>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    #[serde(default)]
    temperature_2m: Option<f64>,
    #[serde(default)]
    relative_humidity_2m: Option<f64>,
    #[serde(default)]
    precipitation: Option<f64>,
    #[serde(default)]
    wind_speed_10m: Option<f64>, // km/h by default
}

impl OpenMeteoClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    fn request_url(&self, latitude: f64, longitude: f64) -> Result<reqwest::Url> {
        reqwest::Url::parse_with_params(
            &self.url,
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                (
                    "current",
                    "temperature_2m,relative_humidity_2m,precipitation,wind_speed_10m".to_string(),
                ),
                ("timezone", "auto".to_string()),
                ("forecast_days", "1".to_string()),
            ],
        )
        .map_err(|e| YoncaError::Config(format!("Invalid Open-Meteo URL '{}': {}", self.url, e)))
    }

    pub async fn fetch_current(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions> {
        let url = self.request_url(latitude, longitude)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| YoncaError::ResolutionFailed(format!("Open-Meteo: {}", e)))?;

        if !response.status().is_success() {
            return Err(YoncaError::ResolutionFailed(format!(
                "Open-Meteo returned {}",
                response.status()
            )));
        }

        let body: OpenMeteoResponse = response.json().await.map_err(|e| {
            YoncaError::ResolutionFailed(format!("Failed to parse Open-Meteo response: {}", e))
        })?;

        Self::convert_response(body)
    }

    fn convert_response(body: OpenMeteoResponse) -> Result<CurrentConditions> {
        let current = body.current.ok_or_else(|| {
            YoncaError::ResolutionFailed("Open-Meteo response has no current block".into())
        })?;

        let temperature = current.temperature_2m.ok_or_else(|| {
            YoncaError::ResolutionFailed("Open-Meteo response has no temperature".into())
        })?;

        Ok(CurrentConditions {
            temperature,
            humidity: current.relative_humidity_2m.unwrap_or(0.0),
            precipitation_mm: current.precipitation.unwrap_or(0.0),
            wind_speed_kmh: current.wind_speed_10m.unwrap_or(0.0),
        })
    }

    pub async fn test_connection(&self) -> Result<bool> {
        let url = self.request_url(40.41, 49.87)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| YoncaError::DataSourceUnavailable(format!("Open-Meteo: {}", e)))?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> OpenMeteoClient {
        OpenMeteoClient::new(
            "https://api.open-meteo.com/v1/forecast",
            Duration::from_secs(10),
        )
        .unwrap()
    }

    #[test]
    fn request_url_carries_coordinates_and_fields() {
        let url = client().request_url(40.68, 46.36).unwrap();
        let query = url.query().unwrap_or_default().to_string();
        assert!(query.contains("latitude=40.68"));
        assert!(query.contains("longitude=46.36"));
        assert!(query.contains("forecast_days=1"));
        assert!(query.contains("wind_speed_10m"));
    }

    #[test]
    fn converts_current_block() {
        let body: OpenMeteoResponse = serde_json::from_str(
            r#"{"current":{"time":"2026-01-10T07:00","temperature_2m":-1.6,"relative_humidity_2m":83.4,"precipitation":0.3,"wind_speed_10m":14.5}}"#,
        )
        .unwrap();
        let conditions = OpenMeteoClient::convert_response(body).unwrap();
        assert_eq!(conditions.temperature, -1.6);
        assert_eq!(conditions.humidity, 83.4);
        assert_eq!(conditions.precipitation_mm, 0.3);
        assert_eq!(conditions.wind_speed_kmh, 14.5);
    }

    #[test]
    fn missing_current_block_fails_resolution() {
        let body: OpenMeteoResponse = serde_json::from_str(r#"{"latitude":40.0}"#).unwrap();
        assert!(matches!(
            OpenMeteoClient::convert_response(body),
            Err(YoncaError::ResolutionFailed(_))
        ));
    }
}
