use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum VoiceServiceError {
    #[error("dependency error: {0}")]
    Dependency(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("voice not found")]
    NotFound,
    #[error("voice name already exists")]
    DuplicateName,
    #[error("plan limit reached: {0}")]
    PlanLimit(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AppError> for VoiceServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::BadRequest(msg) => VoiceServiceError::Invalid(msg),
            AppError::NotFound(_) => VoiceServiceError::NotFound,
            AppError::Conflict(_) => VoiceServiceError::DuplicateName,
            AppError::PlanLimit(msg) => VoiceServiceError::PlanLimit(msg),
            _ => VoiceServiceError::Dependency(err.to_string()),
        }
    }
}

impl From<VoiceServiceError> for AppError {
    fn from(err: VoiceServiceError) -> Self {
        match err {
            VoiceServiceError::Invalid(msg) => AppError::BadRequest(msg),
            VoiceServiceError::NotFound => AppError::NotFound("Voice not found".to_string()),
            VoiceServiceError::DuplicateName => AppError::Conflict(
                "A voice with this name already exists. Please choose a different name"
                    .to_string(),
            ),
            VoiceServiceError::PlanLimit(msg) => AppError::PlanLimit(msg),
            VoiceServiceError::Storage(msg) => AppError::ExternalService(msg),
            VoiceServiceError::Dependency(msg) => AppError::Internal(msg),
            VoiceServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
