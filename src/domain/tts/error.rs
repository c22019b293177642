use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum SynthesisServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("insufficient tokens")]
    InsufficientTokens { remaining: i64 },
    #[error("upstream failure: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for SynthesisServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => SynthesisServiceError::Invalid(msg),
            AppError::InsufficientTokens { remaining } => {
                SynthesisServiceError::InsufficientTokens { remaining }
            }
            _ => SynthesisServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<SynthesisServiceError> for AppError {
    fn from(err: SynthesisServiceError) -> Self {
        match err {
            SynthesisServiceError::Invalid(msg) => AppError::BadRequest(msg),
            SynthesisServiceError::InsufficientTokens { remaining } => {
                AppError::InsufficientTokens { remaining }
            }
            SynthesisServiceError::Upstream {
                status: Some(status),
                message,
            } => AppError::UpstreamStatus { status, message },
            SynthesisServiceError::Upstream {
                status: None,
                message,
            } => AppError::ExternalService(message),
            SynthesisServiceError::Dependency(msg) => AppError::Internal(msg),
            SynthesisServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
