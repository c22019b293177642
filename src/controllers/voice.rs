use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::voice::{CustomVoice, VoiceService, VoiceServiceApi},
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
};

/// Uploaded clips are capped well above any realistic reference sample
const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

pub struct VoiceController {
    voice_service: Arc<VoiceService>,
}

impl VoiceController {
    pub fn new(voice_service: Arc<VoiceService>) -> Self {
        Self { voice_service }
    }

    /// GET /api/voices - List the caller's custom voices
    pub async fn list_voices(
        State(controller): State<Arc<VoiceController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<Vec<CustomVoice>>> {
        let voices = controller
            .voice_service
            .list_voices(auth_user.user_id)
            .await
            .map_err(AppError::from)?;
        Ok(Json(voices))
    }

    /// POST /api/upload - Upload a voice clip (multipart: audio, name)
    pub async fn upload(
        State(controller): State<Arc<VoiceController>>,
        Extension(auth_user): Extension<AuthUser>,
        mut multipart: Multipart,
    ) -> AppResult<(StatusCode, Json<CustomVoice>)> {
        let mut audio: Option<Vec<u8>> = None;
        let mut name: Option<String> = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {}", e)))?
        {
            let field_name = field.name().map(|s| s.to_string());
            match field_name.as_deref() {
                Some("audio") => {
                    let bytes = field.bytes().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read audio field: {}", e))
                    })?;
                    if bytes.len() > MAX_AUDIO_BYTES {
                        return Err(AppError::PayloadTooLarge(
                            "Audio file exceeds the 10 MB limit".to_string(),
                        ));
                    }
                    audio = Some(bytes.to_vec());
                }
                Some("name") => {
                    let text = field.text().await.map_err(|e| {
                        AppError::BadRequest(format!("Failed to read name field: {}", e))
                    })?;
                    name = Some(text);
                }
                // Unknown fields are skipped, not rejected
                _ => {}
            }
        }

        let audio = audio
            .ok_or_else(|| AppError::BadRequest("No audio file provided".to_string()))?;
        let name =
            name.ok_or_else(|| AppError::BadRequest("Voice name is required".to_string()))?;

        let voice = controller
            .voice_service
            .create_voice(auth_user.user_id, &name, audio)
            .await
            .map_err(AppError::from)?;

        Ok((StatusCode::CREATED, Json(voice)))
    }

    /// DELETE /api/voices/{id} - Delete an owned voice
    pub async fn delete_voice(
        State(controller): State<Arc<VoiceController>>,
        Extension(auth_user): Extension<AuthUser>,
        Path(voice_id): Path<Uuid>,
    ) -> AppResult<StatusCode> {
        controller
            .voice_service
            .delete_voice(auth_user.user_id, voice_id)
            .await
            .map_err(AppError::from)?;
        Ok(StatusCode::NO_CONTENT)
    }
}
