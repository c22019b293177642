use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::{
    domain::tts::{SynthesisOutcome, SynthesisRequest, SynthesisService, SynthesisServiceApi},
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

pub struct TtsController {
    synthesis_service: Arc<SynthesisService>,
}

impl TtsController {
    pub fn new(synthesis_service: Arc<SynthesisService>) -> Self {
        Self { synthesis_service }
    }

    /// POST /api/tts - Metered synthesis proxy
    ///
    /// One token per call: debited before the provider call, refunded if
    /// it fails. The response carries the post-debit balance.
    pub async fn synthesize(
        State(controller): State<Arc<TtsController>>,
        Extension(auth_user): Extension<AuthUser>,
        Json(request): Json<SynthesisRequest>,
    ) -> AppResult<Json<SynthesisOutcome>> {
        let outcome = controller
            .synthesis_service
            .synthesize(auth_user.user_id, request)
            .await
            .map_err(AppError::from)?;

        Ok(Json(outcome))
    }

    /// GET /api/task/{id} - Proxy an async task-status lookup
    pub async fn task_status(
        State(controller): State<Arc<TtsController>>,
        Extension(_auth_user): Extension<AuthUser>,
        Path(task_id): Path<String>,
    ) -> AppResult<Json<serde_json::Value>> {
        let status = controller
            .synthesis_service
            .task_status(&task_id)
            .await
            .map_err(AppError::from)?;

        Ok(Json(status))
    }
}
