use serde::{Deserialize, Serialize};

use super::model::{Plan, User};

/// Response for GET /api/user/tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenSnapshot {
    pub tokens: i64,
    pub plan: Plan,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
}

impl From<User> for TokenSnapshot {
    fn from(user: User) -> Self {
        Self {
            tokens: user.tokens,
            plan: user.plan,
            name: user.name,
            email: user.email,
        }
    }
}
