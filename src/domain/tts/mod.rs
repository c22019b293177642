pub mod dto;
pub mod error;
pub mod service;

pub use dto::{SynthesisOutcome, SynthesisPayload, SynthesisRequest};
pub use error::SynthesisServiceError;
pub use service::{SynthesisService, SynthesisServiceApi};
