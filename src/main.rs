use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voicelab_backend::infrastructure::config::{Config, LogFormat};
use voicelab_backend::infrastructure::db::{check_connection, create_pool};
use voicelab_backend::infrastructure::http::start_http_server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting VoiceLab Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. Instantiate repositories (inject db pool and provider clients)
    tracing::info!("Instantiating repositories...");
    let user_repo = Arc::new(voicelab_backend::infrastructure::repositories::UserRepository::new(pool.clone()));
    let voice_repo = Arc::new(voicelab_backend::infrastructure::repositories::VoiceRepository::new(pool.clone()));
    let refresh_token_repo = Arc::new(voicelab_backend::infrastructure::repositories::RefreshTokenRepository::new(pool.clone()));
    let inference_repo: Arc<dyn voicelab_backend::infrastructure::repositories::InferenceRepository> =
        Arc::new(voicelab_backend::infrastructure::repositories::BeamInferenceRepository::new(
            config.beam_api_url.clone(),
            config.beam_task_api_url.clone(),
            config.beam_api_key.clone(),
            config.synthesis_timeout_secs,
        ));
    let storage_repo: Arc<dyn voicelab_backend::infrastructure::repositories::StorageRepository> =
        Arc::new(voicelab_backend::infrastructure::repositories::SupabaseStorageRepository::new(
            config.supabase_url.clone(),
            config.supabase_service_key.clone(),
            config.voice_bucket.clone(),
        ));

    // 2. Instantiate provider clients
    tracing::info!("Instantiating provider clients...");
    let github_oauth_client = Arc::new(voicelab_backend::infrastructure::oauth::GitHubOAuthClient::new(
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
        config.github_redirect_uri.clone(),
    ));
    let polar_client = Arc::new(voicelab_backend::infrastructure::billing::PolarClient::new(
        config.polar_api_url.clone(),
        config.polar_access_token.clone(),
    ));

    // 3. Instantiate services (inject repositories and clients)
    tracing::info!("Instantiating services...");
    let auth_service = Arc::new(voicelab_backend::domain::auth::AuthService::new(
        user_repo.clone(),
        refresh_token_repo.clone(),
        config.jwt_secret.clone(),
        config.jwt_expiration_hours,
        config.refresh_token_expiration_days,
    ));
    let user_service = Arc::new(voicelab_backend::domain::user::UserService::new(
        user_repo.clone(),
    ));
    let synthesis_service = Arc::new(voicelab_backend::domain::tts::SynthesisService::new(
        user_repo.clone(),
        inference_repo,
    ));
    let voice_service = Arc::new(voicelab_backend::domain::voice::VoiceService::new(
        voice_repo.clone(),
        user_repo.clone(),
        storage_repo,
    ));
    let billing_service = Arc::new(voicelab_backend::domain::billing::BillingService::new(
        user_repo.clone(),
        polar_client,
        config.polar_product_id.clone(),
        config.app_url.clone(),
    ));

    // 4. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let auth_controller = Arc::new(voicelab_backend::controllers::auth::AuthController::new(auth_service.clone()));
    let oauth_controller = Arc::new(voicelab_backend::controllers::oauth::OAuthController::new(
        github_oauth_client,
        user_repo.clone(),
        auth_service,
    ));
    let tts_controller = Arc::new(voicelab_backend::controllers::tts::TtsController::new(synthesis_service));
    let voice_controller = Arc::new(voicelab_backend::controllers::voice::VoiceController::new(voice_service));
    let user_controller = Arc::new(voicelab_backend::controllers::user::UserController::new(user_service));
    let billing_controller = Arc::new(voicelab_backend::controllers::billing::BillingController::new(
        billing_service,
        config.polar_webhook_secret.clone(),
        config.app_url.clone(),
    ));

    // Start HTTP server with all routes
    start_http_server(
        pool,
        config,
        user_repo,
        auth_controller,
        oauth_controller,
        tts_controller,
        voice_controller,
        user_controller,
        billing_controller,
    )
    .await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "voicelab_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "voicelab_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
