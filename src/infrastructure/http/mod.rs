use axum::{middleware, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use crate::{
    controllers::{
        auth::AuthController, billing::BillingController, health, oauth::OAuthController,
        tts::TtsController, user::UserController, voice::VoiceController,
    },
    infrastructure::auth::{auth_middleware, request_id_middleware},
};

use crate::infrastructure::repositories::UserRepository;

/// Build the application router. Shared with the e2e harness so tests
/// exercise the same routing and middleware stack as production.
#[allow(clippy::too_many_arguments)]
pub fn build_router(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    user_repo: Arc<UserRepository>,
    auth_controller: Arc<AuthController>,
    oauth_controller: Arc<OAuthController>,
    tts_controller: Arc<TtsController>,
    voice_controller: Arc<VoiceController>,
    user_controller: Arc<UserController>,
    billing_controller: Arc<BillingController>,
) -> Router {
    // Synthesis routes (need auth)
    let tts_routes = Router::new()
        .route("/api/tts", axum::routing::post(TtsController::synthesize))
        .route("/api/task/:taskId", get(TtsController::task_status))
        .with_state(tts_controller.clone())
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    // Voice routes (need auth); uploads carry audio blobs, so the body
    // limit is raised above axum's default
    let voice_routes = Router::new()
        .route("/api/voices", get(VoiceController::list_voices))
        .route("/api/upload", axum::routing::post(VoiceController::upload))
        .route(
            "/api/voices/:voiceId",
            axum::routing::delete(VoiceController::delete_voice),
        )
        .with_state(voice_controller.clone())
        .layer(axum::extract::DefaultBodyLimit::max(12 * 1024 * 1024))
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    // User routes (require authentication)
    let user_routes = Router::new()
        .route("/api/user/tokens", get(UserController::get_tokens))
        .with_state(user_controller.clone())
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    // Billing routes (require authentication)
    let billing_routes = Router::new()
        .route("/api/checkout", get(BillingController::checkout))
        .route(
            "/api/checkout/embed",
            axum::routing::post(BillingController::checkout_embed),
        )
        .route("/api/portal", get(BillingController::portal))
        .with_state(billing_controller.clone())
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    // Webhook route (public - authenticated by signature, not session)
    let webhook_routes = Router::new()
        .route(
            "/api/webhook/billing",
            axum::routing::post(BillingController::webhook),
        )
        .with_state(billing_controller.clone());

    // Auth routes (public - no auth required)
    let auth_routes = Router::new()
        .route("/auth/refresh", axum::routing::post(AuthController::refresh))
        .route("/auth/logout", axum::routing::post(AuthController::logout))
        .with_state(auth_controller.clone());

    // OAuth routes (public - no auth required)
    let oauth_routes = Router::new()
        .route("/auth/oauth/github", get(OAuthController::initiate_github))
        .route("/auth/callback/github", get(OAuthController::github_callback))
        .with_state(oauth_controller.clone());

    // Logout all requires auth
    let auth_protected_routes = Router::new()
        .route(
            "/auth/logout/all",
            axum::routing::post(AuthController::logout_all),
        )
        .with_state(auth_controller.clone())
        .layer(middleware::from_fn_with_state(
            (user_repo.clone(), config.clone()),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool.clone())
        .merge(auth_routes)
        .merge(oauth_routes)
        .merge(auth_protected_routes)
        .merge(tts_routes)
        .merge(voice_routes)
        .merge(user_routes)
        .merge(billing_routes)
        .merge(webhook_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server with all routes configured
#[allow(clippy::too_many_arguments)]
pub async fn start_http_server(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    user_repo: Arc<UserRepository>,
    auth_controller: Arc<AuthController>,
    oauth_controller: Arc<OAuthController>,
    tts_controller: Arc<TtsController>,
    voice_controller: Arc<VoiceController>,
    user_controller: Arc<UserController>,
    billing_controller: Arc<BillingController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(
        pool,
        config.clone(),
        user_repo,
        auth_controller,
        oauth_controller,
        tts_controller,
        voice_controller,
        user_controller,
        billing_controller,
    );

    // Start server
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
