use super::inference_repository::{InferenceError, InferenceOutput, InferenceRepository};
use crate::domain::tts::SynthesisPayload;
use async_trait::async_trait;
use std::time::Duration;

/// Beam Cloud implementation of the inference repository
pub struct BeamInferenceRepository {
    api_url: String,
    task_api_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl BeamInferenceRepository {
    pub fn new(
        api_url: String,
        task_api_url: String,
        api_key: String,
        timeout_secs: u64,
    ) -> Self {
        // One client with the bounded timeout baked in; a hung provider
        // call resolves as an error and triggers the caller's refund path.
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            api_url,
            task_api_url,
            api_key,
            http_client,
        }
    }
}

#[async_trait]
impl InferenceRepository for BeamInferenceRepository {
    async fn synthesize(
        &self,
        payload: &SynthesisPayload,
    ) -> Result<InferenceOutput, InferenceError> {
        let start_time = std::time::Instant::now();

        let response = self
            .http_client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(payload)
            .send()
            .await
            .map_err(|e| InferenceError {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Inference request rejected"
            );
            return Err(InferenceError {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let output = response
            .json::<InferenceOutput>()
            .await
            .map_err(|e| InferenceError {
                status: None,
                message: format!("malformed response body: {}", e),
            })?;

        tracing::info!(
            provider = "beam",
            latency_ms = start_time.elapsed().as_millis(),
            has_audio_url = output.audio_url.is_some(),
            has_task_id = output.task_id.is_some(),
            "Synthesis request completed"
        );

        Ok(output)
    }

    async fn task_status(&self, task_id: &str) -> Result<serde_json::Value, InferenceError> {
        let url = format!("{}/{}", self.task_api_url.trim_end_matches('/'), task_id);

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(|e| InferenceError {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| InferenceError {
            status: None,
            message: e.to_string(),
        })?;

        if !status.is_success() {
            tracing::error!(
                task_id = %task_id,
                status = status.as_u16(),
                body = %body,
                "Task status lookup rejected"
            );
            return Err(InferenceError {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| InferenceError {
            status: None,
            message: format!("malformed task status body: {}", e),
        })
    }
}
