use crate::error::AppResult;
use crate::infrastructure::db::DbPool;
use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, FromRow)]
pub struct StoredRefreshToken {
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
}

impl StoredRefreshToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

pub struct RefreshTokenRepository {
    pool: Arc<DbPool>,
}

impl RefreshTokenRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Store a new refresh token
    pub async fn create(
        &self,
        user_id: Uuid,
        token: &str,
        expiration_days: i64,
    ) -> AppResult<()> {
        let pool = self.pool.as_ref();
        let id = Uuid::new_v4();
        let now = Utc::now();
        let expires_at = now + Duration::days(expiration_days);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (id, user_id, token, expires_at, created_at, revoked)
            VALUES ($1, $2, $3, $4, $5, false)
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Look up a refresh token; the caller decides what expiry/revocation mean
    pub async fn find(&self, token: &str) -> AppResult<Option<StoredRefreshToken>> {
        let pool = self.pool.as_ref();
        let stored = sqlx::query_as::<_, StoredRefreshToken>(
            r#"
            SELECT user_id, expires_at, revoked
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(stored)
    }

    /// Revoke a single refresh token
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE token = $1
            "#,
        )
        .bind(token)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Revoke all refresh tokens for a user
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<()> {
        let pool = self.pool.as_ref();
        sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE user_id = $1 AND NOT revoked
            "#,
        )
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(())
    }
}
