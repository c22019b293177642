use serde::Deserialize;

/// Raw webhook envelope as delivered by the billing provider
#[derive(Debug, Deserialize)]
pub struct WebhookEnvelope {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Subscription lifecycle events this service reacts to. Everything else
/// is acknowledged and ignored.
#[derive(Debug, Clone, PartialEq)]
pub enum BillingEvent {
    SubscriptionActive {
        customer_id: Option<String>,
        /// Correlation value set in checkout metadata
        user_id: Option<String>,
    },
    SubscriptionCanceled {
        user_id: Option<String>,
    },
    SubscriptionRevoked {
        customer_id: Option<String>,
    },
    Unhandled {
        event_type: String,
    },
}

impl BillingEvent {
    pub fn from_envelope(envelope: WebhookEnvelope) -> Self {
        let data = &envelope.data;
        let customer_id = string_field(data, "customer_id");
        let user_id = data
            .get("metadata")
            .and_then(|m| m.get("user_id"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());

        match envelope.event_type.as_str() {
            "subscription.active" => BillingEvent::SubscriptionActive {
                customer_id,
                user_id,
            },
            "subscription.canceled" => BillingEvent::SubscriptionCanceled { user_id },
            "subscription.revoked" => BillingEvent::SubscriptionRevoked { customer_id },
            _ => BillingEvent::Unhandled {
                event_type: envelope.event_type,
            },
        }
    }
}

fn string_field(data: &serde_json::Value, key: &str) -> Option<String> {
    data.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}
