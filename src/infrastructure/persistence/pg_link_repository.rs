//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::warn;

use crate::domain::entities::{Link, LinkPage, LinkQuery, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on_slug;
use crate::utils::search::contains_pattern;
use crate::utils::slug::{MAX_GENERATION_ATTEMPTS, generate_slug};

/// Row shape of the `links` table.
#[derive(Debug, sqlx::FromRow)]
struct LinkRow {
    id: i64,
    slug: String,
    url: String,
    expires_at: Option<DateTime<Utc>>,
    visits: i64,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link::new(r.id, r.slug, r.url, r.expires_at, r.visits)
    }
}

/// PostgreSQL repository for link storage.
///
/// Slug uniqueness is enforced by the `links_slug_key` constraint, and the
/// visit increment is a single conditional `UPDATE ... RETURNING`, so both
/// hold under any number of concurrent callers and service instances.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    async fn insert(&self, slug: &str, new_link: &NewLink) -> Result<Link, sqlx::Error> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            INSERT INTO links (slug, url, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, slug, url, expires_at, visits
            "#,
        )
        .bind(slug)
        .bind(&new_link.url)
        .bind(new_link.expires_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row.into())
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        if let Some(slug) = &new_link.slug {
            return Ok(self.insert(slug, &new_link).await?);
        }

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let slug = generate_slug();

            match self.insert(&slug, &new_link).await {
                Ok(link) => return Ok(link),
                Err(e) if is_unique_violation_on_slug(&e) => {
                    warn!(attempt, slug = %slug, "Generated slug collided, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique slug",
            json!({ "reason": "Too many collisions", "attempts": MAX_GENERATION_ATTEMPTS }),
        ))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, slug, url, expires_at, visits
            FROM links
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn increment_visits_if_active(&self, slug: &str) -> Result<Option<Link>, AppError> {
        // One statement: the row lock taken by UPDATE serializes concurrent
        // increments, and the expiry predicate is re-evaluated under that lock.
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            UPDATE links
            SET visits = visits + 1
            WHERE slug = $1
              AND (expires_at IS NULL OR expires_at > NOW())
            RETURNING id, slug, url, expires_at, visits
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Link::from))
    }

    async fn search(&self, query: &LinkQuery) -> Result<LinkPage, AppError> {
        let pattern = query.has_search().then(|| contains_pattern(&query.search));

        let items = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, slug, url, expires_at, visits
            FROM links
            WHERE ($1::text IS NULL OR url ILIKE $1 OR slug ILIKE $1)
            ORDER BY id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern.as_deref())
        .bind(query.limit)
        .bind(query.offset)
        .fetch_all(self.pool.as_ref());

        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM links
            WHERE ($1::text IS NULL OR url ILIKE $1 OR slug ILIKE $1)
            "#,
        )
        .bind(pattern.as_deref())
        .fetch_one(self.pool.as_ref());

        let (rows, total) = tokio::try_join!(items, total)?;

        Ok(LinkPage {
            items: rows.into_iter().map(Link::from).collect(),
            total,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(self.pool.as_ref()).await?;
        Ok(())
    }
}
