use super::dto::{SynthesisOutcome, SynthesisPayload, SynthesisRequest};
use super::error::SynthesisServiceError;
use crate::domain::user::User;
use crate::infrastructure::repositories::{InferenceRepository, UserRepository};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub struct SynthesisService {
    user_repo: Arc<UserRepository>,
    inference_repo: Arc<dyn InferenceRepository>,
}

impl SynthesisService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        inference_repo: Arc<dyn InferenceRepository>,
    ) -> Self {
        Self {
            user_repo,
            inference_repo,
        }
    }
}

#[async_trait]
pub trait SynthesisServiceApi: Send + Sync {
    /// Synthesize Hebrew speech for a given user.
    ///
    /// This operation:
    /// - Validates the prompt (non-empty, contains Hebrew script)
    /// - Applies a provisional one-token debit before the provider call
    /// - Refunds the debit if the provider call fails
    ///
    /// Returns the provider result along with the post-debit balance.
    async fn synthesize(
        &self,
        user_id: Uuid,
        request: SynthesisRequest,
    ) -> Result<SynthesisOutcome, SynthesisServiceError>;

    /// Proxy a task-status lookup for an async synthesis task. Not
    /// metered: the debit happened when the task was submitted.
    async fn task_status(
        &self,
        task_id: &str,
    ) -> Result<serde_json::Value, SynthesisServiceError>;
}

#[async_trait]
impl SynthesisServiceApi for SynthesisService {
    async fn synthesize(
        &self,
        user_id: Uuid,
        request: SynthesisRequest,
    ) -> Result<SynthesisOutcome, SynthesisServiceError> {
        // 1. Validate before touching the balance or the network
        let payload = validate_request(request)?;

        tracing::info!(
            user_id = %user_id,
            prompt_count = payload.prompt.len(),
            nikud = payload.nikud,
            vc = payload.vc,
            has_ref_audio = payload.ref_audio.is_some(),
            "Synthesis request"
        );

        // 2. Advisory balance read; produces the friendly remaining-balance
        //    error. The decrement below is the authoritative guard.
        let user = self.find_user(user_id).await?;
        if user.tokens < 1 {
            return Err(SynthesisServiceError::InsufficientTokens {
                remaining: user.tokens,
            });
        }

        // 3. Provisional debit: conditional atomic decrement. A concurrent
        //    request may have drained the balance since the read above.
        let remaining = self
            .user_repo
            .debit_token(user_id)
            .await
            .map_err(|e| SynthesisServiceError::Dependency(e.to_string()))?
            .ok_or(SynthesisServiceError::InsufficientTokens { remaining: 0 })?;

        // If the process dies between here and the refund below, one token
        // leaks. There is no durable intent log to reconcile from.
        tracing::debug!(user_id = %user_id, remaining = remaining, "Token debited");

        // 4. Provider call; bounded timeout lives in the repository
        match self.inference_repo.synthesize(&payload).await {
            Ok(output) => Ok(SynthesisOutcome {
                audio_url: output.audio_url,
                task_id: output.task_id,
                status: output.status,
                tokens_remaining: remaining,
            }),
            Err(provider_err) => {
                // 5. Compensating credit: net balance returns to its
                //    pre-call value before the error is surfaced
                match self.user_repo.credit_tokens(user_id, 1).await {
                    Ok(balance) => {
                        tracing::warn!(
                            user_id = %user_id,
                            balance = balance,
                            error = %provider_err,
                            "Synthesis failed, token refunded"
                        );
                    }
                    Err(refund_err) => {
                        tracing::error!(
                            user_id = %user_id,
                            provider_error = %provider_err,
                            refund_error = %refund_err,
                            "Synthesis failed AND refund failed; one token lost"
                        );
                    }
                }

                Err(SynthesisServiceError::Upstream {
                    status: provider_err.status,
                    message: provider_err.message,
                })
            }
        }
    }

    async fn task_status(
        &self,
        task_id: &str,
    ) -> Result<serde_json::Value, SynthesisServiceError> {
        if task_id.trim().is_empty() {
            return Err(SynthesisServiceError::Invalid(
                "Task ID is required".to_string(),
            ));
        }

        self.inference_repo
            .task_status(task_id)
            .await
            .map_err(|e| SynthesisServiceError::Upstream {
                status: e.status,
                message: e.message,
            })
    }
}

impl SynthesisService {
    async fn find_user(&self, user_id: Uuid) -> Result<User, SynthesisServiceError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| SynthesisServiceError::Dependency(e.to_string()))?
            .ok_or_else(|| SynthesisServiceError::Invalid("User not found".to_string()))
    }
}

/// Check the prompt and produce the provider payload.
/// Rejections here happen before any balance mutation or network call.
fn validate_request(
    request: SynthesisRequest,
) -> Result<SynthesisPayload, SynthesisServiceError> {
    let text = request
        .prompt
        .first()
        .map(|s| s.trim())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(SynthesisServiceError::Invalid(
            "Prompt is required and must be non-empty".to_string(),
        ));
    }

    if !contains_hebrew(text) {
        return Err(SynthesisServiceError::Invalid(
            "Text must contain Hebrew characters".to_string(),
        ));
    }

    Ok(SynthesisPayload::from(request))
}

/// True if the text contains at least one character from the Hebrew block
fn contains_hebrew(text: &str) -> bool {
    let hebrew_pattern = regex::Regex::new(r"[\u{0590}-\u{05FF}]").unwrap();
    hebrew_pattern.is_match(text)
}
