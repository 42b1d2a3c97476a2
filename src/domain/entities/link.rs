//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};

/// A shortened URL with its visit counter.
///
/// Only `visits` ever changes after creation, and only through the store's
/// atomic increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub id: i64,
    pub slug: String,
    pub url: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub visits: i64,
}

impl Link {
    /// Creates a new Link instance.
    pub fn new(
        id: i64,
        slug: String,
        url: String,
        expires_at: Option<DateTime<Utc>>,
        visits: i64,
    ) -> Self {
        Self {
            id,
            slug,
            url,
            expires_at,
            visits,
        }
    }

    /// Returns true if the link can still be redirected at `now`.
    ///
    /// A link with no expiry is always active; otherwise it is active strictly
    /// before its expiry instant.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|e| e > now)
    }

    /// Returns true if the link has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        !self.is_active_at(Utc::now())
    }
}

/// Input data for creating a new link.
///
/// `slug: None` asks the store to generate one at insert time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLink {
    pub url: String,
    pub slug: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewLink {
    /// Materializes the link row with an assigned id and slug.
    pub fn into_link(self, id: i64, slug: String) -> Link {
        Link::new(id, slug, self.url, self.expires_at, 0)
    }
}

/// Search and pagination input for listing links.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkQuery {
    /// Case-insensitive substring matched against `url` or `slug`; empty matches all.
    pub search: String,
    pub offset: i64,
    pub limit: i64,
}

impl LinkQuery {
    pub fn new(search: impl Into<String>, offset: i64, limit: i64) -> Self {
        Self {
            search: search.into(),
            offset,
            limit,
        }
    }

    /// Returns true if a search term is present.
    pub fn has_search(&self) -> bool {
        !self.search.is_empty()
    }
}

/// One page of links plus the number of all matching links.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkPage {
    pub items: Vec<Link>,
    pub total: i64,
}
