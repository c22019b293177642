use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum BillingServiceError {
    /// Transient/correctable failure; webhook delivery should be retried
    #[error("dependency error: {0}")]
    Dependency(String),
    /// Billing provider rejected or failed a request
    #[error("billing provider error: {0}")]
    Provider(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<BillingServiceError> for AppError {
    fn from(err: BillingServiceError) -> Self {
        match err {
            BillingServiceError::Dependency(msg) => AppError::Internal(msg),
            BillingServiceError::Provider(msg) => AppError::ExternalService(msg),
            BillingServiceError::Other(e) => AppError::Internal(e.to_string()),
        }
    }
}
