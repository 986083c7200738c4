use crate::analytics::models::ClickRecord;
use crate::models::ShortUrl;
use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code already exists")]
    Conflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// One interface, two interchangeable implementations (SQLite and
/// in-memory). Selected once at process startup, never switched
/// mid-request.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Initialize the storage (create tables, etc.)
    async fn init(&self) -> Result<()>;

    /// Create a new shortened URL with the given code
    async fn create_url(
        &self,
        short_code: &str,
        original_url: &str,
        tags: &[String],
        creator_ip: &str,
    ) -> StorageResult<ShortUrl>;

    /// Get a shortened URL by short code
    async fn get_url(&self, short_code: &str) -> Result<Option<ShortUrl>>;

    /// List URLs created from the given address, newest first
    async fn list_urls_by_creator(&self, creator_ip: &str) -> Result<Vec<ShortUrl>>;

    /// Append one click record. The click log is append-only: records
    /// are never edited or deleted once written.
    async fn record_click(&self, click: &ClickRecord) -> Result<()>;

    /// All click records for a code, newest first
    async fn clicks_for_code(&self, short_code: &str) -> Result<Vec<ClickRecord>>;

    /// Number of clicks recorded for a code
    async fn click_count(&self, short_code: &str) -> Result<i64>;
}
