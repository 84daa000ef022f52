use std::sync::Arc;

use tracing::info;

use crate::server::models::gallery::GalleryImage;
use crate::server::services::notion::{NotionError, NotionService};
use crate::server::services::session::{CursorState, SessionStore};

/// Nominal number of images a client pulls per request. Initial requests
/// fill half of this so the first paint is cheap.
pub const IMAGES_PER_PAGE: usize = 15;

/// One batch of undelivered projections for a session.
#[derive(Debug, Clone)]
pub struct GalleryBatch {
    pub image_data: Vec<GalleryImage>,
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

impl GalleryBatch {
    fn drained() -> Self {
        Self {
            image_data: Vec::new(),
            next_cursor: None,
            has_more: false,
        }
    }
}

pub struct GalleryService {
    notion: Arc<NotionService>,
    sessions: SessionStore,
    images_per_page: usize,
}

impl GalleryService {
    pub fn new(notion: Arc<NotionService>, sessions: SessionStore) -> Self {
        Self::with_images_per_page(notion, sessions, IMAGES_PER_PAGE)
    }

    pub fn with_images_per_page(
        notion: Arc<NotionService>,
        sessions: SessionStore,
        images_per_page: usize,
    ) -> Self {
        Self {
            notion,
            sessions,
            images_per_page,
        }
    }

    /// Produce the next batch of undelivered images for `session_id`.
    ///
    /// Consumes at most one upstream page per call, so a batch may come back
    /// short of capacity even when more data exists; `has_more` errs toward
    /// "ask again" whenever the batch was filled or upstream reported more.
    /// A session whose upstream is drained answers from memory without
    /// another fetch.
    pub async fn next_batch(
        &self,
        session_id: &str,
        initial: bool,
    ) -> Result<GalleryBatch, NotionError> {
        let session = self.sessions.get_or_create(session_id).await;
        // Held across the upstream fetch: concurrent requests for one
        // session serialize, so seen_ids and the cursor advance atomically.
        let mut session = session.lock().await;

        let start_cursor = match &session.cursor {
            CursorState::Exhausted => {
                info!("session {session_id} is drained, skipping upstream fetch");
                return Ok(GalleryBatch::drained());
            }
            CursorState::AtCursor(cursor) => cursor.clone(),
        };

        let batch_size = if initial {
            self.images_per_page / 2
        } else {
            self.images_per_page
        };

        let page = self.notion.fetch_page(start_cursor.as_deref()).await?;

        let mut image_data = Vec::with_capacity(batch_size);
        for entry in &page.results {
            if image_data.len() == batch_size {
                break;
            }
            if session.seen_ids.contains(&entry.id) {
                continue;
            }
            if let Some(image) = entry.project() {
                session.seen_ids.insert(entry.id.clone());
                image_data.push(image);
            }
        }

        let filled = image_data.len() == batch_size;
        let has_more = page.has_more || filled;
        session.cursor = if page.next_cursor.is_none() && !page.has_more && !filled {
            CursorState::Exhausted
        } else {
            CursorState::AtCursor(page.next_cursor.clone())
        };

        info!(
            "session {session_id}: {} new images, next_cursor: {:?}, has_more: {has_more}",
            image_data.len(),
            page.next_cursor
        );

        Ok(GalleryBatch {
            image_data,
            next_cursor: page.next_cursor.clone(),
            has_more,
        })
    }
}
