pub mod error;
pub mod event;
pub mod service;

pub use error::BillingServiceError;
pub use event::{BillingEvent, WebhookEnvelope};
pub use service::BillingService;
