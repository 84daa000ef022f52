use axum::extract::State;
use axum::http::StatusCode;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::server::config::AppState;
use crate::server::handlers::ErrorResponse;

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactResponse {
    pub status: String,
    pub message: String,
}

pub async fn send_contact_email(
    State(state): State<AppState>,
    Form(form): Form<ContactForm>,
) -> Result<Json<ContactResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!("contact form submission from: {}", form.email);

    state
        .email
        .send_contact_message(&form.name, &form.email, &form.message)
        .await
        .map_err(|e| {
            error!("failed to relay contact message: {e}");
            let status = if e.is_validation() {
                StatusCode::BAD_REQUEST
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (
                status,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    Ok(Json(ContactResponse {
        status: "success".to_string(),
        message: "Email sent successfully".to_string(),
    }))
}
