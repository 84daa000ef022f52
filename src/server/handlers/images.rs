use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::server::config::AppState;
use crate::server::handlers::ErrorResponse;
use crate::server::models::gallery::GalleryImage;

#[derive(Debug, Deserialize)]
pub struct ImagesQuery {
    pub session_id: Option<String>,
    pub initial: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImagesResponse {
    pub image_data: Vec<GalleryImage>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

pub async fn get_images(
    State(state): State<AppState>,
    Query(params): Query<ImagesQuery>,
) -> Result<Json<ImagesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let session_id = match params.session_id.as_deref() {
        Some(id) if !id.is_empty() && id != "null" => id,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Invalid session ID".to_string(),
                }),
            ))
        }
    };
    let initial = params
        .initial
        .as_deref()
        .map(|raw| raw.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    info!("images request, session_id: {session_id}, initial: {initial}");

    let batch = state
        .gallery
        .next_batch(session_id, initial)
        .await
        .map_err(|e| {
            error!("failed to fetch images: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
        })?;

    Ok(Json(ImagesResponse {
        image_data: batch.image_data,
        next_cursor: batch.next_cursor,
        has_more: batch.has_more,
    }))
}
