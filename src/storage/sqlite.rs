use crate::analytics::models::ClickRecord;
use crate::models::ShortUrl;
use crate::storage::{Storage, StorageError, StorageResult};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};
use std::sync::Arc;

pub struct SqliteStorage {
    pool: Arc<SqlitePool>,
}

impl SqliteStorage {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        Ok(Self {
            pool: Arc::new(pool),
        })
    }
}

/// Raw row shape: tags comma-joined, timestamps as unix seconds.
#[derive(FromRow)]
struct UrlRow {
    id: i64,
    short_code: String,
    original_url: String,
    tags: String,
    created_at: i64,
    creator_ip: String,
}

impl UrlRow {
    fn into_model(self) -> ShortUrl {
        ShortUrl {
            id: self.id,
            short_code: self.short_code,
            original_url: self.original_url,
            created_at: from_unix(self.created_at),
            tags: split_tags(&self.tags),
            creator_ip: self.creator_ip,
        }
    }
}

#[derive(FromRow)]
struct ClickRow {
    short_code: String,
    ip_address: String,
    country: String,
    region: String,
    city: String,
    user_agent: String,
    browser: String,
    os: String,
    device_type: String,
    referer: String,
    clicked_at: i64,
}

impl ClickRow {
    fn into_model(self) -> ClickRecord {
        ClickRecord {
            short_code: self.short_code,
            ip_address: self.ip_address,
            country: self.country,
            region: self.region,
            city: self.city,
            user_agent: self.user_agent,
            browser: self.browser,
            os: self.os,
            device_type: self.device_type,
            referer: self.referer,
            clicked_at: from_unix(self.clicked_at),
        }
    }
}

fn from_unix(seconds: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(seconds, 0).unwrap_or_default()
}

fn split_tags(tags: &str) -> Vec<String> {
    if tags.is_empty() {
        Vec::new()
    } else {
        tags.split(',').map(str::to_string).collect()
    }
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS urls (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                short_code TEXT NOT NULL UNIQUE,
                original_url TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '',
                created_at INTEGER NOT NULL,
                creator_ip TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_urls_short_code ON urls(short_code)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_urls_creator_ip ON urls(creator_ip)")
            .execute(self.pool.as_ref())
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clicks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                short_code TEXT NOT NULL,
                ip_address TEXT NOT NULL DEFAULT '',
                country TEXT NOT NULL DEFAULT '',
                region TEXT NOT NULL DEFAULT '',
                city TEXT NOT NULL DEFAULT '',
                user_agent TEXT NOT NULL DEFAULT '',
                browser TEXT NOT NULL DEFAULT '',
                os TEXT NOT NULL DEFAULT '',
                device_type TEXT NOT NULL DEFAULT '',
                referer TEXT NOT NULL DEFAULT '',
                clicked_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(self.pool.as_ref())
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_clicks_short_code ON clicks(short_code, clicked_at)",
        )
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn create_url(
        &self,
        short_code: &str,
        original_url: &str,
        tags: &[String],
        creator_ip: &str,
    ) -> StorageResult<ShortUrl> {
        let created_at = Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO urls (short_code, original_url, tags, created_at, creator_ip)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(short_code) DO NOTHING
            "#,
        )
        .bind(short_code)
        .bind(original_url)
        .bind(tags.join(","))
        .bind(created_at)
        .bind(creator_ip)
        .execute(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Conflict);
        }

        let url = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, short_code, original_url, tags, created_at, creator_ip
            FROM urls
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| StorageError::Other(e.into()))?;

        Ok(url.into_model())
    }

    async fn get_url(&self, short_code: &str) -> Result<Option<ShortUrl>> {
        let url = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, short_code, original_url, tags, created_at, creator_ip
            FROM urls
            WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(url.map(UrlRow::into_model))
    }

    async fn list_urls_by_creator(&self, creator_ip: &str) -> Result<Vec<ShortUrl>> {
        let urls = sqlx::query_as::<_, UrlRow>(
            r#"
            SELECT id, short_code, original_url, tags, created_at, creator_ip
            FROM urls
            WHERE creator_ip = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(creator_ip)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(urls.into_iter().map(UrlRow::into_model).collect())
    }

    async fn record_click(&self, click: &ClickRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO clicks (
                short_code, ip_address, country, region, city,
                user_agent, browser, os, device_type, referer, clicked_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&click.short_code)
        .bind(&click.ip_address)
        .bind(&click.country)
        .bind(&click.region)
        .bind(&click.city)
        .bind(&click.user_agent)
        .bind(&click.browser)
        .bind(&click.os)
        .bind(&click.device_type)
        .bind(&click.referer)
        .bind(click.clicked_at.timestamp())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn clicks_for_code(&self, short_code: &str) -> Result<Vec<ClickRecord>> {
        let clicks = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT short_code, ip_address, country, region, city,
                   user_agent, browser, os, device_type, referer, clicked_at
            FROM clicks
            WHERE short_code = ?
            ORDER BY clicked_at DESC, id DESC
            "#,
        )
        .bind(short_code)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(clicks.into_iter().map(ClickRow::into_model).collect())
    }

    async fn click_count(&self, short_code: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM clicks WHERE short_code = ?
            "#,
        )
        .bind(short_code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(count)
    }
}
