use crate::analytics::models::ClickRecord;
use crate::models::ShortUrl;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

/// Ephemeral fallback store. Holds everything in process memory;
/// used when SQLite is unavailable or explicitly selected. Data is
/// lost on restart.
#[derive(Default)]
pub struct MemoryStorage {
    urls: DashMap<String, ShortUrl>,
    clicks: DashMap<String, Vec<ClickRecord>>,
    next_id: AtomicI64,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn init(&self) -> Result<()> {
        Ok(())
    }

    async fn create_url(
        &self,
        short_code: &str,
        original_url: &str,
        tags: &[String],
        creator_ip: &str,
    ) -> StorageResult<ShortUrl> {
        match self.urls.entry(short_code.to_string()) {
            Entry::Occupied(_) => Err(StorageError::Conflict),
            Entry::Vacant(entry) => {
                let url = ShortUrl {
                    id: self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
                    short_code: short_code.to_string(),
                    original_url: original_url.to_string(),
                    created_at: Utc::now(),
                    tags: tags.to_vec(),
                    creator_ip: creator_ip.to_string(),
                };
                entry.insert(url.clone());
                Ok(url)
            }
        }
    }

    async fn get_url(&self, short_code: &str) -> Result<Option<ShortUrl>> {
        Ok(self.urls.get(short_code).map(|entry| entry.value().clone()))
    }

    async fn list_urls_by_creator(&self, creator_ip: &str) -> Result<Vec<ShortUrl>> {
        let mut urls: Vec<ShortUrl> = self
            .urls
            .iter()
            .filter(|entry| entry.value().creator_ip == creator_ip)
            .map(|entry| entry.value().clone())
            .collect();

        urls.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(urls)
    }

    async fn record_click(&self, click: &ClickRecord) -> Result<()> {
        self.clicks
            .entry(click.short_code.clone())
            .or_default()
            .push(click.clone());
        Ok(())
    }

    async fn clicks_for_code(&self, short_code: &str) -> Result<Vec<ClickRecord>> {
        let Some(list) = self.clicks.get(short_code) else {
            return Ok(Vec::new());
        };

        // Newest first; equal timestamps keep the later insert first,
        // matching the SQLite ordering.
        let mut clicks: Vec<ClickRecord> = list.value().iter().rev().cloned().collect();
        clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at));
        Ok(clicks)
    }

    async fn click_count(&self, short_code: &str) -> Result<i64> {
        Ok(self
            .clicks
            .get(short_code)
            .map(|list| list.value().len() as i64)
            .unwrap_or(0))
    }
}
