use crate::infrastructure::db::DbPool;
use crate::{
    domain::voice::CustomVoice,
    error::{AppError, AppResult},
};
use std::sync::Arc;
use uuid::Uuid;

pub struct VoiceRepository {
    pool: Arc<DbPool>,
}

impl VoiceRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Get all custom voices for a user, oldest first
    pub async fn find_by_user(&self, user_id: Uuid) -> AppResult<Vec<CustomVoice>> {
        let pool = self.pool.as_ref();
        let voices = sqlx::query_as::<_, CustomVoice>(
            r#"
            SELECT id, user_id, name, url, created_at
            FROM custom_voices
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(voices)
    }

    /// Get a voice by ID
    pub async fn find_by_id(&self, voice_id: Uuid) -> AppResult<Option<CustomVoice>> {
        let pool = self.pool.as_ref();
        let voice = sqlx::query_as::<_, CustomVoice>(
            r#"
            SELECT id, user_id, name, url, created_at
            FROM custom_voices
            WHERE id = $1
            "#,
        )
        .bind(voice_id)
        .fetch_optional(pool)
        .await?;

        Ok(voice)
    }

    /// Count voices owned by a user
    pub async fn count_by_user(&self, user_id: Uuid) -> AppResult<i64> {
        let pool = self.pool.as_ref();
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM custom_voices
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Insert a new voice row. A duplicate (user_id, name) pair surfaces
    /// as Conflict so the handler can report the name collision.
    pub async fn create(
        &self,
        id: Uuid,
        user_id: Uuid,
        name: &str,
        url: &str,
    ) -> AppResult<CustomVoice> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        let voice = sqlx::query_as::<_, CustomVoice>(
            r#"
            INSERT INTO custom_voices (id, user_id, name, url, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, name, url, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(name)
        .bind(url)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_unique_violation() {
                    return AppError::Conflict(
                        "A voice with this name already exists".to_string(),
                    );
                }
            }
            AppError::Database(e)
        })?;

        Ok(voice)
    }

    /// Delete a voice row
    pub async fn delete(&self, voice_id: Uuid) -> AppResult<bool> {
        let pool = self.pool.as_ref();
        let result = sqlx::query(
            r#"
            DELETE FROM custom_voices
            WHERE id = $1
            "#,
        )
        .bind(voice_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
