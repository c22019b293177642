use super::{generate_refresh_token, JwtManager};
use super::dto::TokenResponse;
use crate::{
    error::{AppError, AppResult},
    infrastructure::repositories::{RefreshTokenRepository, UserRepository},
};
use std::sync::Arc;
use uuid::Uuid;

pub struct AuthService {
    user_repo: Arc<UserRepository>,
    refresh_token_repo: Arc<RefreshTokenRepository>,
    jwt_secret: String,
    jwt_expiration_hours: i64,
    refresh_token_expiration_days: i64,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        refresh_token_repo: Arc<RefreshTokenRepository>,
        jwt_secret: String,
        jwt_expiration_hours: i64,
        refresh_token_expiration_days: i64,
    ) -> Self {
        Self {
            user_repo,
            refresh_token_repo,
            jwt_secret,
            jwt_expiration_hours,
            refresh_token_expiration_days,
        }
    }

    /// Refresh access token using refresh token (rotates the refresh token)
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<TokenResponse> {
        let stored = self
            .refresh_token_repo
            .find(refresh_token)
            .await?
            .ok_or(AppError::InvalidRefreshToken)?;

        if stored.revoked || stored.is_expired() {
            return Err(AppError::RefreshTokenExpired);
        }

        let user = self
            .user_repo
            .find_by_id(stored.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        // Rotate: revoke the old token before issuing the new pair
        self.refresh_token_repo.revoke(refresh_token).await?;

        self.issue_tokens(user.id, &user.email).await
    }

    /// Logout user by revoking refresh token
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        self.refresh_token_repo.revoke(refresh_token).await?;
        Ok(())
    }

    /// Logout user from all devices by revoking all refresh tokens
    pub async fn logout_all(&self, user_id: Uuid) -> AppResult<()> {
        self.refresh_token_repo.revoke_all_for_user(user_id).await?;
        Ok(())
    }

    /// Create tokens for a user (used after OAuth authentication)
    pub async fn create_tokens_for_user(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> AppResult<TokenResponse> {
        self.issue_tokens(user_id, email).await
    }

    async fn issue_tokens(&self, user_id: Uuid, email: &str) -> AppResult<TokenResponse> {
        let jwt_manager = JwtManager::new(self.jwt_secret.clone(), self.jwt_expiration_hours);
        let access_token = jwt_manager.generate_token(user_id, email)?;

        let refresh_token = generate_refresh_token();
        self.refresh_token_repo
            .create(user_id, &refresh_token, self.refresh_token_expiration_days)
            .await?;

        Ok(TokenResponse {
            token: access_token,
            refresh_token,
            expires_in: self.jwt_expiration_hours * 3600,
        })
    }
}
