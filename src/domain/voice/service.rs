use super::error::VoiceServiceError;
use super::model::CustomVoice;
use crate::domain::user::User;
use crate::infrastructure::repositories::{StorageRepository, UserRepository, VoiceRepository};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

const VOICE_CONTENT_TYPE: &str = "audio/wav";

pub struct VoiceService {
    voice_repo: Arc<VoiceRepository>,
    user_repo: Arc<UserRepository>,
    storage_repo: Arc<dyn StorageRepository>,
}

impl VoiceService {
    pub fn new(
        voice_repo: Arc<VoiceRepository>,
        user_repo: Arc<UserRepository>,
        storage_repo: Arc<dyn StorageRepository>,
    ) -> Self {
        Self {
            voice_repo,
            user_repo,
            storage_repo,
        }
    }
}

#[async_trait]
pub trait VoiceServiceApi: Send + Sync {
    async fn list_voices(&self, user_id: Uuid) -> Result<Vec<CustomVoice>, VoiceServiceError>;

    /// Store an uploaded voice clip and register it for the user.
    ///
    /// The blob lands at `{user_id}/{name}.wav` with upsert semantics;
    /// the database row carries the resulting public URL. The per-plan
    /// voice cap is checked against the live row count first.
    async fn create_voice(
        &self,
        user_id: Uuid,
        name: &str,
        audio: Vec<u8>,
    ) -> Result<CustomVoice, VoiceServiceError>;

    /// Delete an owned voice: blob first (best effort), then the row.
    async fn delete_voice(&self, user_id: Uuid, voice_id: Uuid)
        -> Result<(), VoiceServiceError>;
}

#[async_trait]
impl VoiceServiceApi for VoiceService {
    async fn list_voices(&self, user_id: Uuid) -> Result<Vec<CustomVoice>, VoiceServiceError> {
        self.voice_repo
            .find_by_user(user_id)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))
    }

    async fn create_voice(
        &self,
        user_id: Uuid,
        name: &str,
        audio: Vec<u8>,
    ) -> Result<CustomVoice, VoiceServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VoiceServiceError::Invalid(
                "Voice name is required".to_string(),
            ));
        }
        if audio.is_empty() {
            return Err(VoiceServiceError::Invalid(
                "No audio file provided".to_string(),
            ));
        }

        let user = self.find_user(user_id).await?;
        self.check_voice_limit(&user).await?;

        let path = object_path(user_id, name);
        self.storage_repo
            .upload(&path, audio, VOICE_CONTENT_TYPE)
            .await
            .map_err(VoiceServiceError::Storage)?;

        let url = self.storage_repo.public_url(&path);

        // The upload above upserts, so a duplicate name has already
        // overwritten the blob; the unique index on (user_id, name) turns
        // the row insert into the Conflict the caller sees.
        let voice = self
            .voice_repo
            .create(Uuid::new_v4(), user_id, name, &url)
            .await
            .map_err(VoiceServiceError::from)?;

        tracing::info!(
            user_id = %user_id,
            voice_id = %voice.id,
            name = %voice.name,
            "Custom voice saved"
        );

        Ok(voice)
    }

    async fn delete_voice(
        &self,
        user_id: Uuid,
        voice_id: Uuid,
    ) -> Result<(), VoiceServiceError> {
        let voice = self.verify_voice_ownership(voice_id, user_id).await?;

        // Storage cleanup is best effort; an orphaned blob is preferable
        // to a dangling database row pointing at nothing
        if let Some(path) = self.storage_repo.path_from_url(&voice.url) {
            if let Err(e) = self.storage_repo.remove(&path).await {
                tracing::warn!(
                    voice_id = %voice_id,
                    path = %path,
                    error = %e,
                    "Failed to remove voice clip from storage"
                );
            }
        } else {
            tracing::warn!(
                voice_id = %voice_id,
                url = %voice.url,
                "Voice URL does not point into the configured bucket"
            );
        }

        self.voice_repo
            .delete(voice_id)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?;

        Ok(())
    }
}

impl VoiceService {
    async fn find_user(&self, user_id: Uuid) -> Result<User, VoiceServiceError> {
        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?
            .ok_or_else(|| VoiceServiceError::Invalid("User not found".to_string()))
    }

    async fn check_voice_limit(&self, user: &User) -> Result<(), VoiceServiceError> {
        let voice_count = self
            .voice_repo
            .count_by_user(user.id)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?;

        let limit = user.plan.voice_limit();
        if voice_count >= limit {
            return Err(VoiceServiceError::PlanLimit(format!(
                "{} plan allows up to {} custom voice{}. Delete an existing voice or upgrade.",
                user.plan,
                limit,
                if limit == 1 { "" } else { "s" }
            )));
        }

        Ok(())
    }

    /// Absence and ownership mismatch both come back as NotFound so the
    /// response does not reveal whether the id exists
    async fn verify_voice_ownership(
        &self,
        voice_id: Uuid,
        user_id: Uuid,
    ) -> Result<CustomVoice, VoiceServiceError> {
        let voice = self
            .voice_repo
            .find_by_id(voice_id)
            .await
            .map_err(|e| VoiceServiceError::Dependency(e.to_string()))?
            .ok_or(VoiceServiceError::NotFound)?;

        if voice.user_id != user_id {
            return Err(VoiceServiceError::NotFound);
        }

        Ok(voice)
    }
}

/// Object path for a voice clip: one folder per user, name as filename
fn object_path(user_id: Uuid, name: &str) -> String {
    format!("{}/{}.wav", user_id, name)
}
