use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub refresh_token_expiration_days: i64,
    pub environment: Environment,
    pub log_format: LogFormat,
    // GitHub OAuth
    pub github_client_id: String,
    pub github_client_secret: String,
    pub github_redirect_uri: String,
    // Beam inference endpoint
    pub beam_api_url: String,
    pub beam_api_key: String,
    pub beam_task_api_url: String,
    pub synthesis_timeout_secs: u64,
    // Supabase Storage
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub voice_bucket: String,
    // Polar billing
    pub polar_api_url: String,
    pub polar_access_token: String,
    pub polar_webhook_secret: String,
    pub polar_product_id: String,
    // Base URL for checkout/portal redirects
    pub app_url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            refresh_token_expiration_days: env::var("REFRESH_TOKEN_EXPIRATION_DAYS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            github_client_id: env::var("GITHUB_CLIENT_ID")?,
            github_client_secret: env::var("GITHUB_CLIENT_SECRET")?,
            github_redirect_uri: env::var("GITHUB_REDIRECT_URI")?,
            beam_api_url: env::var("BEAM_API_URL")?,
            beam_api_key: env::var("BEAM_API_KEY")?,
            beam_task_api_url: env::var("BEAM_TASK_API_URL")
                .unwrap_or_else(|_| "https://api.beam.cloud/v2/task".to_string()),
            synthesis_timeout_secs: env::var("SYNTHESIS_TIMEOUT_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()?,
            supabase_url: env::var("SUPABASE_URL")?,
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")?,
            voice_bucket: env::var("VOICE_BUCKET")
                .unwrap_or_else(|_| "voice-clips".to_string()),
            polar_api_url: env::var("POLAR_API_URL")
                .unwrap_or_else(|_| "https://sandbox-api.polar.sh".to_string()),
            polar_access_token: env::var("POLAR_ACCESS_TOKEN")?,
            polar_webhook_secret: env::var("POLAR_WEBHOOK_SECRET")?,
            polar_product_id: env::var("POLAR_PRODUCT_ID")?,
            app_url: env::var("APP_URL")?,
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
