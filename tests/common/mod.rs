use axum::Router;

use gallery::server::config::{configure_app, AppConfig};

pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn test_config(upstream_url: &str) -> AppConfig {
    AppConfig {
        notion_api_key: "test-key".to_string(),
        notion_database_id: "test-db".to_string(),
        notion_base_url: upstream_url.to_string(),
        smtp_server: "localhost".to_string(),
        smtp_username: "gallery@example.com".to_string(),
        smtp_password: "password".to_string(),
        contact_recipient: "owner@example.com".to_string(),
        port: 0,
    }
}

pub fn test_app(upstream_url: &str) -> Router {
    configure_app(test_config(upstream_url)).expect("app should configure")
}
