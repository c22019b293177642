use crate::domain::tts::SynthesisPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a synthesis call. The provider answers synchronously with an
/// audio URL, or hands back a task to poll.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error from the inference provider. `status` carries the upstream HTTP
/// status when there was one; transport errors and malformed bodies have
/// none.
#[derive(Debug, Clone)]
pub struct InferenceError {
    pub status: Option<u16>,
    pub message: String,
}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.status {
            Some(code) => write!(f, "inference provider returned {}: {}", code, self.message),
            None => write!(f, "inference provider unreachable: {}", self.message),
        }
    }
}

/// Repository for TTS inference operations.
/// Abstracts the remote synthesis endpoint so tests can substitute a stub
/// and the provider can be swapped without touching the metering logic.
#[async_trait]
pub trait InferenceRepository: Send + Sync {
    /// Submit a synthesis request. Must apply a bounded timeout; a timeout
    /// is reported as an error like any other provider failure.
    async fn synthesize(&self, payload: &SynthesisPayload) -> Result<InferenceOutput, InferenceError>;

    /// Look up the status of an async synthesis task
    async fn task_status(&self, task_id: &str) -> Result<serde_json::Value, InferenceError>;
}
