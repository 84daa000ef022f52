use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;
use reqwest::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

pub mod types;

pub use types::{DatabaseEntry, Page};

const NOTION_VERSION: &str = "2022-06-28";
/// Larger than any client batch so one fetch can absorb records that are
/// duplicates or carry no image.
const UPSTREAM_PAGE_SIZE: usize = 100;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PAGE_CACHE_CAPACITY: u64 = 128;
const PAGE_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum NotionError {
    #[error("upstream query failed: {status} - {body}")]
    UpstreamStatus { status: StatusCode, body: String },
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
}

pub struct NotionService {
    client: reqwest::Client,
    query_url: String,
    api_key: String,
    page_cache: Cache<String, Arc<Page>>,
}

impl NotionService {
    pub fn new(base_url: &str, api_key: String, database_id: String) -> Result<Self, NotionError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            query_url: format!(
                "{}/v1/databases/{}/query",
                base_url.trim_end_matches('/'),
                database_id
            ),
            api_key,
            page_cache: Cache::builder()
                .max_capacity(PAGE_CACHE_CAPACITY)
                .time_to_live(PAGE_CACHE_TTL)
                .build(),
        })
    }

    /// Fetch one upstream page starting at `start_cursor` (`None` means the
    /// start of the sequence), sorted by creation time descending.
    ///
    /// Pages are memoized per cursor with a short TTL, so newly created
    /// upstream records become visible within the TTL rather than being
    /// hidden by the cache.
    pub async fn fetch_page(&self, start_cursor: Option<&str>) -> Result<Arc<Page>, NotionError> {
        let cache_key = start_cursor.unwrap_or_default().to_string();
        if let Some(page) = self.page_cache.get(&cache_key) {
            debug!("page cache hit for cursor {:?}", start_cursor);
            return Ok(page);
        }

        let mut body = json!({
            "page_size": UPSTREAM_PAGE_SIZE,
            "sorts": [{"property": "Created time", "direction": "descending"}],
        });
        if let Some(cursor) = start_cursor {
            body["start_cursor"] = json!(cursor);
        }

        let response = self
            .client
            .post(&self.query_url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotionError::UpstreamStatus { status, body });
        }

        let page: Page = response.json().await?;
        info!(
            "fetched {} entries from upstream, has_more: {}",
            page.results.len(),
            page.has_more
        );

        let page = Arc::new(page);
        self.page_cache.insert(cache_key, page.clone());
        Ok(page)
    }
}
