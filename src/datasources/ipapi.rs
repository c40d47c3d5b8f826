use crate::error::{Result, YoncaError};
use crate::models::LocationData;
use serde::Deserialize;
use std::time::Duration;

/// Approximate location of the caller from its public IP (ipapi.co).
#[derive(Clone)]
pub struct IpApiClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    country_name: Option<String>,
    region: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpApiClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub async fn lookup(&self) -> Result<LocationData> {
        let response = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| YoncaError::ResolutionFailed(format!("IP geolocation: {}", e)))?;

        if !response.status().is_success() {
            return Err(YoncaError::ResolutionFailed(format!(
                "IP geolocation returned {}",
                response.status()
            )));
        }

        let body: IpApiResponse = response.json().await.map_err(|e| {
            YoncaError::ResolutionFailed(format!("Failed to parse geolocation response: {}", e))
        })?;

        Self::convert_response(body)
    }

    fn convert_response(body: IpApiResponse) -> Result<LocationData> {
        if body.error {
            return Err(YoncaError::ResolutionFailed(format!(
                "IP geolocation refused: {}",
                body.reason.unwrap_or_else(|| "unknown reason".into())
            )));
        }

        let (latitude, longitude) = match (body.latitude, body.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                return Err(YoncaError::ResolutionFailed(
                    "Could not determine location from IP".into(),
                ))
            }
        };

        Ok(LocationData {
            latitude,
            longitude,
            city: body.city.unwrap_or_else(|| "Unknown".into()),
            country: body.country_name.unwrap_or_else(|| "Unknown".into()),
            region: body.region.filter(|r| !r.is_empty()),
        })
    }

    pub async fn test_connection(&self) -> Result<bool> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| YoncaError::DataSourceUnavailable(format!("ipapi: {}", e)))?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<LocationData> {
        IpApiClient::convert_response(serde_json::from_str(json).unwrap())
    }

    #[test]
    fn converts_full_response() {
        let location = parse(
            r#"{"ip":"5.191.0.1","city":"Sheki","region":"Shaki","country_name":"Azerbaijan","latitude":41.19,"longitude":47.17}"#,
        )
        .unwrap();
        assert_eq!(location.city, "Sheki");
        assert_eq!(location.country, "Azerbaijan");
        assert_eq!(location.region.as_deref(), Some("Shaki"));
    }

    #[test]
    fn missing_coordinates_fail_resolution() {
        let err = parse(r#"{"city":"Baku","country_name":"Azerbaijan"}"#).unwrap_err();
        assert!(matches!(err, YoncaError::ResolutionFailed(_)));
    }

    #[test]
    fn rate_limit_body_fails_resolution() {
        let err = parse(r#"{"error":true,"reason":"RateLimited"}"#).unwrap_err();
        assert!(err.to_string().contains("RateLimited"));
    }

    #[test]
    fn missing_names_default_to_unknown() {
        let location = parse(r#"{"latitude":40.4,"longitude":49.9,"region":""}"#).unwrap();
        assert_eq!(location.city, "Unknown");
        assert!(location.region.is_none());
    }
}
