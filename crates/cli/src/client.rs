//! API client for the screening service

use anyhow::{Context, Result};
use reqwest::{Client, Response, StatusCode};
use screener_lib::report::{ErrorBody, HealthReport, ModelInfo, PredictResponse};
use screener_lib::FEATURE_NAMES;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

/// Non-success reply from the service
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("rejected by service ({status}): {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("service error ({status}): {message}")]
    Server { status: StatusCode, message: String },
}

/// API client for the screening service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    pub async fn health(&self) -> Result<HealthReport> {
        self.get("health").await
    }

    pub async fn model_info(&self) -> Result<ModelInfo> {
        self.get("model-info").await
    }

    /// Submit answers in item order; items not given are left for the service to default
    pub async fn predict(&self, answers: &[u8]) -> Result<PredictResponse> {
        self.post("predict", &prediction_body(answers)).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        parse(response).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        parse(response).await
    }
}

/// Request body with one `qN` field per given answer
pub fn prediction_body(answers: &[u8]) -> Value {
    let fields: Map<String, Value> = FEATURE_NAMES
        .iter()
        .zip(answers)
        .map(|(name, value)| (name.to_string(), Value::from(*value)))
        .collect();
    Value::Object(fields)
}

async fn parse<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.context("Failed to parse response");
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .map(|body| body.error)
        .unwrap_or(text);

    if status.is_client_error() {
        Err(ApiError::Rejected { status, message }.into())
    } else {
        Err(ApiError::Server { status, message }.into())
    }
}
