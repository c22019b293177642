pub mod beam_inference_repository;
pub mod inference_repository;
pub mod refresh_token_repository;
pub mod storage_repository;
pub mod supabase_storage_repository;
pub mod user_repository;
pub mod voice_repository;

pub use beam_inference_repository::BeamInferenceRepository;
pub use inference_repository::{InferenceError, InferenceOutput, InferenceRepository};
pub use refresh_token_repository::RefreshTokenRepository;
pub use storage_repository::StorageRepository;
pub use supabase_storage_repository::SupabaseStorageRepository;
pub use user_repository::UserRepository;
pub use voice_repository::VoiceRepository;
