use super::error::BillingServiceError;
use super::event::BillingEvent;
use crate::infrastructure::billing::PolarClient;
use crate::infrastructure::repositories::UserRepository;
use std::sync::Arc;
use uuid::Uuid;

/// Tokens granted when a subscription becomes active
const PRO_TOKEN_GRANT: i64 = 1000;

pub struct BillingService {
    user_repo: Arc<UserRepository>,
    polar_client: Arc<PolarClient>,
    product_id: String,
    app_url: String,
}

impl BillingService {
    pub fn new(
        user_repo: Arc<UserRepository>,
        polar_client: Arc<PolarClient>,
        product_id: String,
        app_url: String,
    ) -> Self {
        Self {
            user_repo,
            polar_client,
            product_id,
            app_url,
        }
    }

    /// Apply a subscription lifecycle event to the account store.
    ///
    /// Returning Err signals the provider to redeliver, so only
    /// transient failures (database unavailable) surface as errors;
    /// missing correlation and unmatched accounts are logged and
    /// swallowed to avoid retry loops that can never succeed.
    pub async fn handle_event(&self, event: BillingEvent) -> Result<(), BillingServiceError> {
        match event {
            BillingEvent::SubscriptionActive {
                customer_id,
                user_id,
            } => self.on_subscription_active(customer_id, user_id).await,
            BillingEvent::SubscriptionCanceled { user_id } => {
                // Plan stays Pro until the period ends; the revoked event
                // does the downgrade
                tracing::info!(
                    user_id = user_id.as_deref().unwrap_or("<unknown>"),
                    "Subscription canceled, active until period end"
                );
                Ok(())
            }
            BillingEvent::SubscriptionRevoked { customer_id } => {
                self.on_subscription_revoked(customer_id).await
            }
            BillingEvent::Unhandled { event_type } => {
                tracing::debug!(event_type = %event_type, "Ignoring webhook event");
                Ok(())
            }
        }
    }

    async fn on_subscription_active(
        &self,
        customer_id: Option<String>,
        user_id: Option<String>,
    ) -> Result<(), BillingServiceError> {
        let Some(raw_user_id) = user_id else {
            tracing::error!("Subscription active event without user_id correlation, dropping");
            return Ok(());
        };

        let Ok(user_id) = Uuid::parse_str(&raw_user_id) else {
            tracing::error!(
                user_id = %raw_user_id,
                "Subscription active event with unparseable user_id, dropping"
            );
            return Ok(());
        };

        let customer_id = customer_id.unwrap_or_default();

        let updated = self
            .user_repo
            .activate_subscription(user_id, &customer_id, PRO_TOKEN_GRANT)
            .await
            .map_err(|e| BillingServiceError::Dependency(e.to_string()))?;

        if updated == 0 {
            tracing::error!(
                user_id = %user_id,
                "Subscription active event for unknown account, dropping"
            );
        } else {
            tracing::info!(
                user_id = %user_id,
                customer_id = %customer_id,
                token_grant = PRO_TOKEN_GRANT,
                "Account upgraded to Pro"
            );
        }

        Ok(())
    }

    async fn on_subscription_revoked(
        &self,
        customer_id: Option<String>,
    ) -> Result<(), BillingServiceError> {
        let Some(customer_id) = customer_id else {
            tracing::error!("Subscription revoked event without customer_id, dropping");
            return Ok(());
        };

        let updated = self
            .user_repo
            .downgrade_by_customer_id(&customer_id)
            .await
            .map_err(|e| BillingServiceError::Dependency(e.to_string()))?;

        if updated == 0 {
            // Retrying cannot resolve an unmatched customer; log for
            // manual review instead
            tracing::error!(
                customer_id = %customer_id,
                "Subscription revoked for unknown customer, dropping"
            );
        } else {
            tracing::info!(customer_id = %customer_id, "Account downgraded to Free");
        }

        Ok(())
    }

    /// Create a hosted/embedded checkout session carrying the user_id
    /// correlation that the webhook handler reads back
    pub async fn create_checkout(
        &self,
        user_id: Uuid,
        embed_origin: Option<&str>,
    ) -> Result<String, BillingServiceError> {
        let success_url = format!("{}/lab", self.app_url);

        self.polar_client
            .create_checkout(&self.product_id, &success_url, embed_origin, user_id)
            .await
            .map_err(|e| BillingServiceError::Provider(e.to_string()))
    }

    /// Billing portal URL for the caller, or None when there is no
    /// provider-side customer yet
    pub async fn portal_url(
        &self,
        user_id: Uuid,
    ) -> Result<Option<String>, BillingServiceError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await
            .map_err(|e| BillingServiceError::Dependency(e.to_string()))?;

        let Some(customer_id) = user.and_then(|u| u.polar_customer_id) else {
            return Ok(None);
        };

        let url = self
            .polar_client
            .create_customer_session(&customer_id)
            .await
            .map_err(|e| BillingServiceError::Provider(e.to_string()))?;

        Ok(Some(url))
    }
}
