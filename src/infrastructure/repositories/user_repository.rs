use crate::infrastructure::db::DbPool;
use crate::{domain::user::User, error::AppResult};
use std::sync::Arc;
use uuid::Uuid;

/// Tokens granted to a freshly provisioned Free account
const SIGNUP_TOKEN_GRANT: i64 = 5;

pub struct UserRepository {
    pool: Arc<DbPool>,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    /// Find user by ID
    pub async fn find_by_id(&self, user_id: Uuid) -> AppResult<Option<User>> {
        let pool = self.pool.as_ref();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Find user by OAuth provider and provider ID
    pub async fn find_by_oauth(
        &self,
        provider: &str,
        provider_id: &str,
    ) -> AppResult<Option<User>> {
        let pool = self.pool.as_ref();
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE oauth_provider = $1 AND oauth_provider_id = $2",
        )
        .bind(provider)
        .bind(provider_id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Create a new user on first sign-in (Free plan, starting token grant)
    pub async fn create(
        &self,
        email: &str,
        name: Option<&str>,
        provider: &str,
        provider_id: &str,
    ) -> AppResult<User> {
        let pool = self.pool.as_ref();
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name, oauth_provider, oauth_provider_id, plan, tokens, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, 'free', $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .bind(provider)
        .bind(provider_id)
        .bind(SIGNUP_TOKEN_GRANT)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Provisional debit of one token.
    ///
    /// The conditional UPDATE is the authoritative balance guard: two
    /// concurrent requests cannot both pass it, and the balance can never
    /// go negative. Returns the post-debit balance, or None if the account
    /// is missing or the balance is already zero.
    pub async fn debit_token(&self, user_id: Uuid) -> AppResult<Option<i64>> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        let remaining = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET tokens = tokens - 1, updated_at = $2
            WHERE id = $1 AND tokens >= 1
            RETURNING tokens
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        Ok(remaining)
    }

    /// Compensating credit after a failed provider call (or a webhook grant)
    pub async fn credit_tokens(&self, user_id: Uuid, amount: i64) -> AppResult<i64> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        let balance = sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET tokens = tokens + $2, updated_at = $3
            WHERE id = $1
            RETURNING tokens
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Ok(balance)
    }

    /// Upgrade to Pro, grant tokens and record the billing customer id.
    /// Returns the number of rows updated (0 when the account is gone).
    pub async fn activate_subscription(
        &self,
        user_id: Uuid,
        polar_customer_id: &str,
        token_grant: i64,
    ) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET plan = 'pro', tokens = tokens + $2, polar_customer_id = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token_grant)
        .bind(polar_customer_id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Downgrade the account matching a billing customer id back to Free.
    /// Returns the number of rows updated (0 when no account matches).
    pub async fn downgrade_by_customer_id(&self, polar_customer_id: &str) -> AppResult<u64> {
        let pool = self.pool.as_ref();
        let now = chrono::Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET plan = 'free', updated_at = $2
            WHERE polar_customer_id = $1
            "#,
        )
        .bind(polar_customer_id)
        .bind(now)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}
