use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

use crate::server::models::gallery::GalleryImage;

const TITLE_FALLBACK: &str = "No Title";

/// One page of query results from the upstream database.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub results: Vec<DatabaseEntry>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseEntry {
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub properties: EntryProperties,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryProperties {
    #[serde(rename = "Title", default, deserialize_with = "lenient")]
    pub title: TitleProperty,
    #[serde(rename = "Images", default, deserialize_with = "lenient")]
    pub images: FilesProperty,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleProperty {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Vec<RichText>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilesProperty {
    #[serde(default, deserialize_with = "lenient")]
    pub files: Vec<FileRef>,
}

/// A file attachment; the upstream stores hosted files under `file` and
/// linked ones under `external`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileRef {
    #[serde(default)]
    pub file: Option<FileUrl>,
    #[serde(default)]
    pub external: Option<FileUrl>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileUrl {
    #[serde(default)]
    pub url: String,
}

/// Accept any JSON shape for a field; a wrong shape decodes to the field's
/// default instead of failing the whole page.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

impl DatabaseEntry {
    /// Project this record into the gallery shape.
    ///
    /// Returns `None` when the record carries no usable image URL. A missing,
    /// empty, or malformed title degrades to a placeholder rather than
    /// dropping the record.
    pub fn project(&self) -> Option<GalleryImage> {
        let url = self
            .properties
            .images
            .files
            .first()
            .and_then(|attachment| attachment.file.as_ref().or(attachment.external.as_ref()))
            .map(|file| file.url.clone())
            .filter(|url| !url.is_empty())?;

        let title = self
            .properties
            .title
            .title
            .first()
            .and_then(|fragment| fragment.plain_text.as_deref())
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .unwrap_or(TITLE_FALLBACK)
            .to_string();

        Some(GalleryImage {
            id: self.id.clone(),
            title,
            url,
        })
    }
}
