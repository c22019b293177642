use axum::{extract::State, Extension, Json};
use std::sync::Arc;

use crate::{
    domain::user::{TokenSnapshot, UserService},
    error::AppResult,
    infrastructure::auth::AuthUser,
};

pub struct UserController {
    user_service: Arc<UserService>,
}

impl UserController {
    pub fn new(user_service: Arc<UserService>) -> Self {
        Self { user_service }
    }

    /// GET /api/user/tokens - Balance and plan snapshot for the caller
    pub async fn get_tokens(
        State(controller): State<Arc<UserController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<TokenSnapshot>> {
        let snapshot = controller
            .user_service
            .get_token_snapshot(auth_user.user_id)
            .await?;
        Ok(Json(snapshot))
    }
}
