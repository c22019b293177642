use crate::e2e::helpers;

use base64::Engine;
use helpers::{TestContext, TEST_WEBHOOK_SECRET};
use hmac::{Hmac, Mac};
use hyper::StatusCode;
use serde_json::json;
use serial_test::serial;
use sha2::Sha256;
use voicelab_backend::domain::user::Plan;

/// Sign a payload the way the billing provider does: HMAC-SHA256 over
/// `{id}.{timestamp}.{body}` with the base64-decoded shared secret
fn sign(msg_id: &str, timestamp: &str, body: &str) -> String {
    let encoded = TEST_WEBHOOK_SECRET.strip_prefix("whsec_").unwrap();
    let key = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .unwrap();

    let mut mac = Hmac::<Sha256>::new_from_slice(&key).unwrap();
    mac.update(format!("{}.{}.{}", msg_id, timestamp, body).as_bytes());
    let sig = base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes());
    format!("v1,{}", sig)
}

async fn deliver(ctx: &TestContext, body: &str) -> crate::e2e::helpers::api_client::ApiResponse {
    let msg_id = "msg_test";
    let timestamp = chrono::Utc::now().timestamp().to_string();
    let signature = sign(msg_id, &timestamp, body);

    ctx.client
        .post_with_headers(
            "/api/webhook/billing",
            body,
            &[
                ("webhook-id", msg_id),
                ("webhook-timestamp", timestamp.as_str()),
                ("webhook-signature", signature.as_str()),
            ],
        )
        .await
        .unwrap()
}

#[tokio::test]
#[serial]
async fn it_should_upgrade_the_account_on_subscription_active() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_user("user@example.com").await.unwrap();
    let starting_tokens = user.tokens;

    let body = json!({
        "type": "subscription.active",
        "data": {
            "id": "sub_1",
            "customer_id": "cus_99",
            "metadata": { "user_id": user.id.to_string() }
        }
    })
    .to_string();

    let response = deliver(&ctx, &body).await;
    response.assert_status(StatusCode::OK);

    let stored = ctx.fixtures.get_user(user.id).await.unwrap();
    assert_eq!(stored.plan, Plan::Pro);
    assert_eq!(stored.tokens, starting_tokens + 1000);
    assert_eq!(stored.polar_customer_id.as_deref(), Some("cus_99"));
}

#[tokio::test]
#[serial]
async fn it_should_drop_active_events_without_correlation_metadata() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_user("user@example.com").await.unwrap();

    let body = json!({
        "type": "subscription.active",
        "data": { "id": "sub_1", "customer_id": "cus_99" }
    })
    .to_string();

    let response = deliver(&ctx, &body).await;

    // Terminal condition: acknowledged so the provider does not retry
    response.assert_status(StatusCode::OK);

    let stored = ctx.fixtures.get_user(user.id).await.unwrap();
    assert_eq!(stored.plan, Plan::Free);
    assert_eq!(stored.tokens, user.tokens);
    assert_eq!(stored.polar_customer_id, None);
}

#[tokio::test]
#[serial]
async fn it_should_keep_the_plan_on_cancellation() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_pro_user("pro@example.com").await.unwrap();

    let body = json!({
        "type": "subscription.canceled",
        "data": {
            "id": "sub_1",
            "customer_id": user.polar_customer_id,
            "metadata": { "user_id": user.id.to_string() }
        }
    })
    .to_string();

    deliver(&ctx, &body).await.assert_status(StatusCode::OK);

    // Still Pro until the period ends
    let stored = ctx.fixtures.get_user(user.id).await.unwrap();
    assert_eq!(stored.plan, Plan::Pro);
}

#[tokio::test]
#[serial]
async fn it_should_downgrade_on_subscription_revoked() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_pro_user("pro@example.com").await.unwrap();

    let body = json!({
        "type": "subscription.revoked",
        "data": {
            "id": "sub_1",
            "customer_id": user.polar_customer_id
        }
    })
    .to_string();

    deliver(&ctx, &body).await.assert_status(StatusCode::OK);

    let stored = ctx.fixtures.get_user(user.id).await.unwrap();
    assert_eq!(stored.plan, Plan::Free);
}

#[tokio::test]
#[serial]
async fn it_should_acknowledge_revocations_for_unknown_customers() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_pro_user("pro@example.com").await.unwrap();

    let body = json!({
        "type": "subscription.revoked",
        "data": { "id": "sub_1", "customer_id": "cus_nobody" }
    })
    .to_string();

    // No retry loop for a customer that will never match
    deliver(&ctx, &body).await.assert_status(StatusCode::OK);

    let stored = ctx.fixtures.get_user(user.id).await.unwrap();
    assert_eq!(stored.plan, Plan::Pro);
}

#[tokio::test]
#[serial]
async fn it_should_acknowledge_unrecognized_event_types() {
    let ctx = TestContext::new().await.unwrap();

    let body = json!({ "type": "order.created", "data": {} }).to_string();
    deliver(&ctx, &body).await.assert_status(StatusCode::OK);
}

#[tokio::test]
#[serial]
async fn it_should_reject_deliveries_with_a_bad_signature() {
    let ctx = TestContext::new().await.unwrap();
    let user = ctx.fixtures.create_user("user@example.com").await.unwrap();

    let body = json!({
        "type": "subscription.active",
        "data": {
            "customer_id": "cus_99",
            "metadata": { "user_id": user.id.to_string() }
        }
    })
    .to_string();

    let timestamp = chrono::Utc::now().timestamp().to_string();
    let response = ctx
        .client
        .post_with_headers(
            "/api/webhook/billing",
            &body,
            &[
                ("webhook-id", "msg_test"),
                ("webhook-timestamp", timestamp.as_str()),
                ("webhook-signature", "v1,Zm9yZ2VkLXNpZ25hdHVyZQ=="),
            ],
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::UNAUTHORIZED);

    // No mutation happened
    let stored = ctx.fixtures.get_user(user.id).await.unwrap();
    assert_eq!(stored.plan, Plan::Free);
}

#[tokio::test]
#[serial]
async fn it_should_reject_deliveries_missing_signature_headers() {
    let ctx = TestContext::new().await.unwrap();

    let body = json!({ "type": "subscription.active", "data": {} }).to_string();
    let response = ctx
        .client
        .post_with_headers("/api/webhook/billing", &body, &[])
        .await
        .unwrap();

    response.assert_status(StatusCode::UNAUTHORIZED);
}
