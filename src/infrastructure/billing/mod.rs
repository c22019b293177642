pub mod polar;
pub mod signature;

pub use polar::PolarClient;
pub use signature::{verify_webhook_signature, SignatureError};
