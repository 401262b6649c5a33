//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Link, LinkStatus, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::{AppError, map_insert_error};

#[derive(Debug, FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    target: String,
    created_at: DateTime<Utc>,
    last_access_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    click_count: i64,
    active: bool,
    is_custom: bool,
}

impl From<LinkRow> for Link {
    fn from(row: LinkRow) -> Self {
        Link {
            id: row.id,
            code: row.code,
            target: row.target,
            created_at: row.created_at,
            last_access_at: row.last_access_at,
            expires_at: row.expires_at,
            click_count: row.click_count,
            status: LinkStatus::from_active(row.active),
            is_custom: row.is_custom,
        }
    }
}

/// PostgreSQL repository for short links.
///
/// Uses bound parameters for every query. Click accounting and deactivation
/// are single `UPDATE` statements, so concurrent callers never lose writes.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO short_links (code, target, expires_at, is_custom)
            VALUES ($1, $2, $3, $4)
            RETURNING id, code, target, created_at, last_access_at, expires_at,
                      click_count, active, is_custom
            "#,
        )
        .bind(&new_link.code)
        .bind(&new_link.target)
        .bind(new_link.expires_at)
        .bind(new_link.is_custom)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| map_insert_error(e, &new_link.code))?;

        Ok(row.into())
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, created_at, last_access_at, expires_at,
                   click_count, active, is_custom
            FROM short_links
            WHERE code = $1 AND active
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn find_active_by_target(
        &self,
        target: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, created_at, last_access_at, expires_at,
                   click_count, active, is_custom
            FROM short_links
            WHERE target = $1
              AND active
              AND (expires_at IS NULL OR expires_at >= $2)
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(target)
        .bind(now)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn exists_active_code(&self, code: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM short_links WHERE code = $1 AND active)",
        )
        .bind(code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(exists)
    }

    async fn record_access(&self, code: &str, at: DateTime<Utc>) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET click_count = click_count + 1,
                last_access_at = $2
            WHERE code = $1 AND active
            "#,
        )
        .bind(code)
        .bind(at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate(&self, code: &str) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE short_links SET active = FALSE WHERE code = $1 AND active")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn deactivate_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET active = FALSE
            WHERE active AND expires_at IS NOT NULL AND expires_at < $1
            "#,
        )
        .bind(now)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected())
    }

    async fn find_latest_by_code(&self, code: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, code, target, created_at, last_access_at, expires_at,
                   click_count, active, is_custom
            FROM short_links
            WHERE code = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn next_sequence(&self) -> Result<u64, AppError> {
        let value = sqlx::query_scalar::<_, i64>("SELECT nextval('short_link_code_seq')")
            .fetch_one(self.pool.as_ref())
            .await?;

        u64::try_from(value).map_err(|_| {
            AppError::internal(
                "Code sequence returned a negative value",
                json!({ "value": value }),
            )
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
