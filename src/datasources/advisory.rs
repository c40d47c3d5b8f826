use crate::config::ApiConfig;
use crate::error::{Result, YoncaError};
use crate::models::{
    AutoWeather, ChatReply, ChatRequest, RecommendationRequest, RecommendationResponse,
};
use serde::Deserialize;

const API_PREFIX: &str = "/api/v1";

/// Client for the Yonca advisory service.
#[derive(Clone)]
pub struct AdvisoryClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

impl AdvisoryClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.base_url, API_PREFIX, path)
    }

    pub async fn recommend(&self, request: &RecommendationRequest) -> Result<RecommendationResponse> {
        let url = self.url("/recommendations");
        tracing::debug!(farm_type = %request.farm_type, region = %request.region, "Requesting recommendations");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| YoncaError::Transport(format!("advisory service unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = Self::error_detail(response).await;
            return Err(YoncaError::Transport(format!("API error: {}{}", status, detail)));
        }

        response.json().await.map_err(|e| {
            YoncaError::Transport(format!("Failed to parse recommendation response: {}", e))
        })
    }

    /// Server-side two-stage resolution: the service geolocates the caller,
    /// fetches current conditions and maps the region itself.
    pub async fn auto_weather(&self) -> Result<AutoWeather> {
        let url = self.url("/weather/auto");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| YoncaError::ResolutionFailed(format!("advisory service: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = Self::error_detail(response).await;
            return Err(YoncaError::ResolutionFailed(format!(
                "weather service returned {}{}",
                status, detail
            )));
        }

        response.json().await.map_err(|e| {
            YoncaError::ResolutionFailed(format!("Failed to parse weather response: {}", e))
        })
    }

    pub async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply> {
        let url = self.url("/chat/message");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| YoncaError::Transport(format!("chat service unreachable: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = Self::error_detail(response).await;
            return Err(YoncaError::Transport(format!("API error: {}{}", status, detail)));
        }

        Ok(response.json().await?)
    }

    /// Test connection to the service health endpoint.
    pub async fn test_connection(&self) -> Result<bool> {
        let url = format!("{}/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| YoncaError::DataSourceUnavailable(format!("Yonca API: {}", e)))?;

        Ok(response.status().is_success())
    }

    async fn error_detail(response: reqwest::Response) -> String {
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(ErrorBody {
                detail: Some(serde_json::Value::String(detail)),
            }) => format!(" - {}", detail),
            Ok(ErrorBody {
                detail: Some(other),
            }) => format!(" - {}", other),
            _ => String::new(),
        }
    }
}
