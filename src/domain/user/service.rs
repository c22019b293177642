use crate::{
    error::{AppError, AppResult},
    infrastructure::repositories::UserRepository,
};
use super::dto::TokenSnapshot;
use std::sync::Arc;
use uuid::Uuid;

pub struct UserService {
    user_repo: Arc<UserRepository>,
}

impl UserService {
    pub fn new(user_repo: Arc<UserRepository>) -> Self {
        Self { user_repo }
    }

    /// Get the caller's balance/plan snapshot
    pub async fn get_token_snapshot(&self, user_id: Uuid) -> AppResult<TokenSnapshot> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(TokenSnapshot::from(user))
    }
}
