use serde::{Deserialize, Serialize};

fn default_false() -> bool {
    false
}

/// Request for POST /api/tts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub prompt: Vec<String>,
    #[serde(default = "default_false")]
    pub nikud: bool,
    #[serde(default = "default_false")]
    pub vc: bool,
    #[serde(default)]
    pub ref_audio: Option<String>,
    #[serde(default)]
    pub ref_text: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Validated payload forwarded verbatim to the inference provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisPayload {
    pub prompt: Vec<String>,
    pub nikud: bool,
    pub vc: bool,
    pub ref_audio: Option<String>,
    pub ref_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl From<SynthesisRequest> for SynthesisPayload {
    fn from(request: SynthesisRequest) -> Self {
        Self {
            prompt: request.prompt,
            nikud: request.nikud,
            vc: request.vc,
            ref_audio: request.ref_audio,
            ref_text: request.ref_text,
            temperature: request.temperature,
        }
    }
}

/// Response for POST /api/tts: the provider's answer plus the post-debit
/// balance
#[derive(Debug, Serialize, Deserialize)]
pub struct SynthesisOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub tokens_remaining: i64,
}
