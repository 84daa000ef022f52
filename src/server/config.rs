use std::sync::Arc;

use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::server::handlers::{contact::send_contact_email, images::get_images};
use crate::server::services::{
    email::EmailService, gallery::GalleryService, notion::NotionService, session::SessionStore,
};

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_NOTION_BASE_URL: &str = "https://api.notion.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub notion_api_key: String,
    pub notion_database_id: String,
    /// Override for tests and staging; production uses the public API host.
    pub notion_base_url: String,
    pub smtp_server: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub contact_recipient: String,
    pub port: u16,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid value for {0}: {1}")]
    InvalidVar(&'static str, String),
}

fn require_var(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

impl AppConfig {
    /// Read the full configuration from the environment. Any missing
    /// variable fails startup here, naming the variable, rather than
    /// failing obscurely on the first request.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidVar("PORT", raw))?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            notion_api_key: require_var("NOTION_API_KEY")?,
            notion_database_id: require_var("NOTION_DATABASE_ID")?,
            notion_base_url: std::env::var("NOTION_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_NOTION_BASE_URL.to_string()),
            smtp_server: require_var("SMTP_SERVER")?,
            smtp_username: require_var("SMTP_USERNAME")?,
            smtp_password: require_var("SMTP_PASSWORD")?,
            contact_recipient: require_var("CONTACT_RECIPIENT")?,
            port,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub gallery: Arc<GalleryService>,
    pub email: Arc<EmailService>,
}

pub fn configure_app(config: AppConfig) -> anyhow::Result<Router> {
    // Initialize services
    let notion = Arc::new(NotionService::new(
        &config.notion_base_url,
        config.notion_api_key,
        config.notion_database_id,
    )?);
    let gallery = Arc::new(GalleryService::new(notion, SessionStore::new()));
    let email = Arc::new(EmailService::new(
        &config.smtp_server,
        config.smtp_username,
        config.smtp_password,
        config.contact_recipient,
    )?);

    Ok(app_router(AppState { gallery, email }))
}

async fn log_request(request: Request, next: Next) -> Response {
    info!("{} {}", request.method(), request.uri().path());
    next.run(request).await
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/images", get(get_images))
        .route("/send_email", post(send_contact_email))
        .layer(middleware::from_fn(log_request))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
