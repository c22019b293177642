use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerSession {
    pub customer_portal_url: Option<String>,
}

/// Thin client for the Polar billing API: checkout session and customer
/// portal session creation. Webhook verification lives in the sibling
/// signature module.
pub struct PolarClient {
    base_url: String,
    access_token: String,
    http_client: reqwest::Client,
}

impl PolarClient {
    pub fn new(base_url: String, access_token: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token,
            http_client: reqwest::Client::new(),
        }
    }

    /// Create a checkout session for the configured product. The user id
    /// travels in metadata and is echoed back in webhook events.
    pub async fn create_checkout(
        &self,
        product_id: &str,
        success_url: &str,
        embed_origin: Option<&str>,
        user_id: Uuid,
    ) -> AppResult<String> {
        let mut body = json!({
            "products": [product_id],
            "success_url": success_url,
            "metadata": { "user_id": user_id.to_string() },
        });
        if let Some(origin) = embed_origin {
            body["embed_origin"] = json!(origin);
        }

        let response = self
            .http_client
            .post(format!("{}/v1/checkouts", self.base_url))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Checkout creation failed: {}", e)))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalService(format!(
                "Checkout creation rejected: {}",
                error_text
            )));
        }

        let session = response
            .json::<CheckoutSession>()
            .await
            .map_err(|e| AppError::ExternalService(format!("Malformed checkout session: {}", e)))?;

        session.url.ok_or_else(|| {
            AppError::ExternalService("Checkout session has no URL".to_string())
        })
    }

    /// Create a customer portal session for an existing provider-side
    /// customer
    pub async fn create_customer_session(&self, customer_id: &str) -> AppResult<String> {
        let response = self
            .http_client
            .post(format!("{}/v1/customer-sessions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.access_token))
            .json(&json!({ "customer_id": customer_id }))
            .send()
            .await
            .map_err(|e| {
                AppError::ExternalService(format!("Customer session creation failed: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalService(format!(
                "Customer session rejected: {}",
                error_text
            )));
        }

        let session = response
            .json::<CustomerSession>()
            .await
            .map_err(|e| AppError::ExternalService(format!("Malformed customer session: {}", e)))?;

        session.customer_portal_url.ok_or_else(|| {
            AppError::ExternalService("Customer session has no portal URL".to_string())
        })
    }
}
