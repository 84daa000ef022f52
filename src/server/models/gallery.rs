use serde::{Deserialize, Serialize};

/// The projection of one upstream record surfaced to the gallery frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: String,
    pub title: String,
    pub url: String,
}
