use serde::{Deserialize, Serialize};

pub mod contact;
pub mod images;

/// Error body shared by every route.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
