pub mod error;
pub mod model;
pub mod service;

pub use error::VoiceServiceError;
pub use model::CustomVoice;
pub use service::{VoiceService, VoiceServiceApi};
