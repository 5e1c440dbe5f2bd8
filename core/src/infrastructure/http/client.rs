use reqwest::{Client, Response};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::domain::{
    common::{ApiConfig, entities::app_errors::CoreError},
    feedback::value_objects::FeedbackInput,
    meal::{
        entities::{AnalysisOutcome, MealRecord},
        payload::{AnalysisPayload, ChatPayload, ErrorPayload},
        ports::DietApi,
        value_objects::{
            AnalyzeMealInput, ChatInput, ConfirmClarificationInput, SaveMealInput, ServiceStatus,
        },
    },
};

/// reqwest adapter for the diet service REST API.
#[derive(Debug, Clone)]
pub struct HttpDietApi {
    base_url: Url,
    client: Client,
}

impl HttpDietApi {
    pub fn new(config: &ApiConfig) -> Result<Self, CoreError> {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &ApiConfig, client: Client) -> Result<Self, CoreError> {
        let mut raw = config.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).map_err(|e| {
            CoreError::InvalidConfig(format!("invalid API base URL {}: {}", config.base_url, e))
        })?;

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, CoreError> {
        self.base_url
            .join(path)
            .map_err(|e| CoreError::InvalidConfig(format!("invalid endpoint {}: {}", path, e)))
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, CoreError> {
        request.send().await.map_err(|e| {
            tracing::error!("Diet API request failed: {}", e);
            CoreError::Network(e.to_string())
        })
    }

    /// Maps a non-2xx answer to a server error when it carries a message.
    async fn check_status(response: Response) -> Result<Response, CoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorPayload>(&body)
            .ok()
            .and_then(|payload| payload.error)
            .filter(|message| !message.is_empty())
        {
            Some(message) => {
                tracing::warn!("Diet API returned {}: {}", status, message);
                Err(CoreError::ServerError(message))
            }
            None => {
                tracing::error!("Diet API returned {} - {}", status, body);
                Err(CoreError::Network(format!("unexpected status {}", status)))
            }
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, CoreError> {
        let response = Self::check_status(response).await?;
        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read Diet API response: {}", e);
            CoreError::Network(e.to_string())
        })?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Diet API response: {}", e);
            CoreError::MalformedResponse(e.to_string())
        })
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, CoreError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.client.post(url).json(body)).await?;
        Self::decode(response).await
    }

    async fn post_unit<B: Serialize>(&self, path: &str, body: &B) -> Result<(), CoreError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.client.post(url).json(body)).await?;
        Self::check_status(response).await.map(|_| ())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CoreError> {
        let url = self.endpoint(path)?;
        let response = self.send(self.client.get(url)).await?;
        Self::decode(response).await
    }
}

impl DietApi for HttpDietApi {
    async fn analyze_meal(&self, input: AnalyzeMealInput) -> Result<AnalysisOutcome, CoreError> {
        self.post_json::<_, AnalysisPayload>("api/analyze-meal", &input)
            .await?
            .into_outcome()
    }

    async fn confirm_clarification(
        &self,
        input: ConfirmClarificationInput,
    ) -> Result<AnalysisOutcome, CoreError> {
        self.post_json::<_, AnalysisPayload>("api/confirm-clarification", &input)
            .await?
            .into_outcome()
    }

    async fn chat(&self, input: ChatInput) -> Result<String, CoreError> {
        self.post_json::<_, ChatPayload>("api/chat", &input)
            .await?
            .into_reply()
    }

    async fn submit_feedback(&self, input: FeedbackInput) -> Result<(), CoreError> {
        self.post_unit("api/ai-feedback", &input).await
    }

    async fn status(&self) -> Result<ServiceStatus, CoreError> {
        self.get_json("api/status").await
    }

    async fn save_meal(&self, input: SaveMealInput) -> Result<(), CoreError> {
        self.post_unit("api/meals", &input).await
    }

    async fn list_meals(&self) -> Result<Vec<MealRecord>, CoreError> {
        self.get_json("api/meals").await
    }

    async fn delete_meal(&self, record_id: i64) -> Result<(), CoreError> {
        let url = self.endpoint(&format!("api/meals/{}", record_id))?;
        let response = self.send(self.client.delete(url)).await?;
        Self::check_status(response).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = HttpDietApi::new(&ApiConfig {
            base_url: "http://localhost:7860/diet".to_string(),
        })
        .unwrap();
        assert_eq!(
            api.endpoint("api/analyze-meal").unwrap().as_str(),
            "http://localhost:7860/diet/api/analyze-meal"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = HttpDietApi::new(&ApiConfig {
            base_url: "not a url".to_string(),
        })
        .unwrap_err();
        assert!(matches!(err, CoreError::InvalidConfig(_)));
    }
}
