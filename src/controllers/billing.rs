use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Redirect,
    Extension, Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::{
    domain::billing::{BillingEvent, BillingService, WebhookEnvelope},
    error::{AppError, AppResult},
    infrastructure::auth::AuthUser,
    infrastructure::billing::verify_webhook_signature,
};

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

pub struct BillingController {
    billing_service: Arc<BillingService>,
    webhook_secret: String,
    app_url: String,
}

impl BillingController {
    pub fn new(
        billing_service: Arc<BillingService>,
        webhook_secret: String,
        app_url: String,
    ) -> Self {
        Self {
            billing_service,
            webhook_secret,
            app_url,
        }
    }

    /// GET /api/checkout - Redirect to a hosted checkout session.
    ///
    /// Provider errors never surface to the browser; they land on the
    /// in-app billing page with a short error code.
    pub async fn checkout(
        State(controller): State<Arc<BillingController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> Redirect {
        match controller
            .billing_service
            .create_checkout(auth_user.user_id, None)
            .await
        {
            Ok(url) => Redirect::to(&url),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create checkout session");
                Redirect::to(&format!("{}/billing?error=checkout_failed", controller.app_url))
            }
        }
    }

    /// POST /api/checkout/embed - Checkout session URL for the embedded
    /// flow
    pub async fn checkout_embed(
        State(controller): State<Arc<BillingController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> AppResult<Json<CheckoutResponse>> {
        let checkout_url = controller
            .billing_service
            .create_checkout(auth_user.user_id, Some(&controller.app_url))
            .await
            .map_err(AppError::from)?;

        Ok(Json(CheckoutResponse { checkout_url }))
    }

    /// GET /api/portal - Redirect to the billing provider's customer
    /// portal
    pub async fn portal(
        State(controller): State<Arc<BillingController>>,
        Extension(auth_user): Extension<AuthUser>,
    ) -> Redirect {
        match controller.billing_service.portal_url(auth_user.user_id).await {
            Ok(Some(url)) => Redirect::to(&url),
            Ok(None) => {
                Redirect::to(&format!("{}/billing?error=no_subscription", controller.app_url))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create portal session");
                Redirect::to(&format!("{}/billing?error=portal_failed", controller.app_url))
            }
        }
    }

    /// POST /api/webhook/billing - Signed billing event delivery.
    ///
    /// Non-2xx responses make the provider redeliver, so only retryable
    /// failures bubble as errors; terminal conditions are acknowledged.
    pub async fn webhook(
        State(controller): State<Arc<BillingController>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> AppResult<StatusCode> {
        let msg_id = required_header(&headers, "webhook-id")?;
        let timestamp = required_header(&headers, "webhook-timestamp")?;
        let signature = required_header(&headers, "webhook-signature")?;

        verify_webhook_signature(
            &controller.webhook_secret,
            msg_id,
            timestamp,
            &body,
            signature,
        )
        .map_err(|e| AppError::Unauthorized(format!("Webhook signature rejected: {}", e)))?;

        let envelope: WebhookEnvelope = serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {}", e)))?;

        let event = BillingEvent::from_envelope(envelope);
        controller
            .billing_service
            .handle_event(event)
            .await
            .map_err(AppError::from)?;

        Ok(StatusCode::OK)
    }
}

fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> AppResult<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized(format!("Missing {} header", name)))
}
