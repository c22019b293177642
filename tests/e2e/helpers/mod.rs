use anyhow::Result;
use axum::Router;
use once_cell::sync::Lazy;
use sqlx::PgPool;
use std::sync::Arc;
use testcontainers::{clients::Cli, Container};
use testcontainers_modules::postgres::Postgres;
use tokio::net::TcpListener;
use uuid::Uuid;
use wiremock::MockServer;

use voicelab_backend::infrastructure::config::{Config, Environment, LogFormat};

pub mod db_pool;

use api_client::TestClient;
use db_pool::{DatabasePool, PooledDatabase};
use fixtures::TestFixtures;

/// Shared secret used by webhook tests; `whsec_` + base64("test-secret-for-webhooks")
pub const TEST_WEBHOOK_SECRET: &str = "whsec_dGVzdC1zZWNyZXQtZm9yLXdlYmhvb2tz";

// Docker client for test containers
static DOCKER: Lazy<Cli> = Lazy::new(Cli::default);

// Shared PostgreSQL container for all tests
static SHARED_CONTAINER: Lazy<SharedContainer> = Lazy::new(SharedContainer::new);

// Global database pool
static DB_POOL: Lazy<DatabasePool> = Lazy::new(|| DatabasePool::new(SHARED_CONTAINER.port));

/// Shared container that lives for the duration of all tests
struct SharedContainer {
    _container: Container<'static, Postgres>,
    port: u16,
}

impl SharedContainer {
    fn new() -> Self {
        let container = DOCKER.run(Postgres::default());
        let port = container.get_host_port_ipv4(5432);

        println!("🐳 Started shared PostgreSQL container on port {}", port);

        Self {
            _container: container,
            port,
        }
    }
}

pub struct TestContext {
    pub client: TestClient,
    #[allow(dead_code)]
    pub pool: PgPool,
    pub config: Config,
    pub fixtures: TestFixtures,
    /// Wiremock server standing in for Beam, Supabase Storage and Polar
    pub mock_server: MockServer,
    _db: PooledDatabase,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        // Get a database from the shared pool
        let pooled_db = DB_POOL.get_database().await?;

        // All upstream providers share one mock server, telling them apart
        // by path
        let mock_server = MockServer::start().await;

        let config = Config {
            database_url: pooled_db.database_url.clone(),
            host: "127.0.0.1".to_string(),
            port: 0, // Will be assigned by the OS
            jwt_secret: "test-jwt-secret-key-for-testing-only".to_string(),
            jwt_expiration_hours: 1,
            refresh_token_expiration_days: 30,
            environment: Environment::Development,
            log_format: LogFormat::Pretty,
            github_client_id: "test_github_client_id".to_string(),
            github_client_secret: "test_github_client_secret".to_string(),
            github_redirect_uri: "http://localhost:8080/auth/callback/github".to_string(),
            beam_api_url: format!("{}/synthesize", mock_server.uri()),
            beam_api_key: "test-beam-key".to_string(),
            beam_task_api_url: format!("{}/v2/task", mock_server.uri()),
            synthesis_timeout_secs: 5,
            supabase_url: mock_server.uri(),
            supabase_service_key: "test-service-key".to_string(),
            voice_bucket: "voice-clips".to_string(),
            polar_api_url: mock_server.uri(),
            polar_access_token: "test-polar-token".to_string(),
            polar_webhook_secret: TEST_WEBHOOK_SECRET.to_string(),
            polar_product_id: "prod_test".to_string(),
            app_url: "http://localhost:5173".to_string(),
        };

        let app = create_app(config.clone(), pooled_db.pool.clone());

        // Start server
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let base_url = format!("http://{}", addr);

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to be ready
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let client = TestClient::new(&base_url);
        let fixtures = TestFixtures::new(pooled_db.pool.clone());

        Ok(Self {
            client,
            pool: pooled_db.pool.clone(),
            config,
            fixtures,
            mock_server,
            _db: pooled_db,
        })
    }
}

/// Build the app against a pooled database with the same wiring as main
fn create_app(config: Config, pool: PgPool) -> Router {
    use voicelab_backend::{
        controllers::{
            auth::AuthController, billing::BillingController, oauth::OAuthController,
            tts::TtsController, user::UserController, voice::VoiceController,
        },
        domain::{
            auth::AuthService, billing::BillingService, tts::SynthesisService,
            user::UserService, voice::VoiceService,
        },
        infrastructure::{
            billing::PolarClient,
            http::build_router,
            oauth::GitHubOAuthClient,
            repositories::{
                BeamInferenceRepository, InferenceRepository, RefreshTokenRepository,
                StorageRepository, SupabaseStorageRepository, UserRepository, VoiceRepository,
            },
        },
    };

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    let user_repo = Arc::new(UserRepository::new(pool.clone()));
    let voice_repo = Arc::new(VoiceRepository::new(pool.clone()));
    let refresh_token_repo = Arc::new(RefreshTokenRepository::new(pool.clone()));
    let inference_repo: Arc<dyn InferenceRepository> = Arc::new(BeamInferenceRepository::new(
        config.beam_api_url.clone(),
        config.beam_task_api_url.clone(),
        config.beam_api_key.clone(),
        config.synthesis_timeout_secs,
    ));
    let storage_repo: Arc<dyn StorageRepository> = Arc::new(SupabaseStorageRepository::new(
        config.supabase_url.clone(),
        config.supabase_service_key.clone(),
        config.voice_bucket.clone(),
    ));

    let github_oauth_client = Arc::new(GitHubOAuthClient::new(
        config.github_client_id.clone(),
        config.github_client_secret.clone(),
        config.github_redirect_uri.clone(),
    ));
    let polar_client = Arc::new(PolarClient::new(
        config.polar_api_url.clone(),
        config.polar_access_token.clone(),
    ));

    let auth_service = Arc::new(AuthService::new(
        user_repo.clone(),
        refresh_token_repo.clone(),
        config.jwt_secret.clone(),
        config.jwt_expiration_hours,
        config.refresh_token_expiration_days,
    ));
    let user_service = Arc::new(UserService::new(user_repo.clone()));
    let synthesis_service = Arc::new(SynthesisService::new(user_repo.clone(), inference_repo));
    let voice_service = Arc::new(VoiceService::new(
        voice_repo.clone(),
        user_repo.clone(),
        storage_repo,
    ));
    let billing_service = Arc::new(BillingService::new(
        user_repo.clone(),
        polar_client,
        config.polar_product_id.clone(),
        config.app_url.clone(),
    ));

    let auth_controller = Arc::new(AuthController::new(auth_service.clone()));
    let oauth_controller = Arc::new(OAuthController::new(
        github_oauth_client,
        user_repo.clone(),
        auth_service,
    ));
    let tts_controller = Arc::new(TtsController::new(synthesis_service));
    let voice_controller = Arc::new(VoiceController::new(voice_service));
    let user_controller = Arc::new(UserController::new(user_service));
    let billing_controller = Arc::new(BillingController::new(
        billing_service,
        config.polar_webhook_secret.clone(),
        config.app_url.clone(),
    ));

    build_router(
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
}

// Helper to generate valid JWT tokens for testing
pub fn generate_test_jwt(user_id: &Uuid, secret: &str) -> String {
    generate_test_jwt_with_email(user_id, "test@example.com", secret)
}

// Helper to generate valid JWT tokens for testing with specific email
pub fn generate_test_jwt_with_email(user_id: &Uuid, email: &str, secret: &str) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        email: String,
        exp: i64,
        iat: i64,
    }

    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        exp: (now + chrono::Duration::hours(1)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}
