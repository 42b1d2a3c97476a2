//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::warn;

use crate::domain::entities::{Link, LinkPage, LinkQuery, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::search::contains_ignore_case;
use crate::utils::slug::{MAX_GENERATION_ATTEMPTS, generate_slug};

/// In-process link store keyed by slug.
///
/// DashMap shards its keys behind separate locks. Insertion goes through the
/// entry API and the visit increment through `get_mut`, so the uniqueness
/// check and the expiry check each run under the same shard write lock as
/// the mutation they guard.
///
/// Contents are lost on restart.
#[derive(Debug)]
pub struct InMemoryLinkRepository {
    links: DashMap<String, Link>,
    next_id: AtomicI64,
}

impl InMemoryLinkRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Inserts under `slug` unless it is taken. Returns `None` on collision.
    fn try_insert(&self, slug: String, new_link: &NewLink) -> Option<Link> {
        match self.links.entry(slug) {
            Entry::Occupied(_) => None,
            Entry::Vacant(vacant) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                let link = new_link.clone().into_link(id, vacant.key().clone());
                vacant.insert(link.clone());
                Some(link)
            }
        }
    }
}

impl Default for InMemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError> {
        if let Some(slug) = &new_link.slug {
            return self.try_insert(slug.clone(), &new_link).ok_or_else(|| {
                AppError::conflict("Unique constraint violation", json!({ "slug": slug }))
            });
        }

        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let slug = generate_slug();

            if let Some(link) = self.try_insert(slug.clone(), &new_link) {
                return Ok(link);
            }

            warn!(attempt, slug = %slug, "Generated slug collided, retrying");
        }

        Err(AppError::internal(
            "Failed to generate unique slug",
            json!({ "reason": "Too many collisions", "attempts": MAX_GENERATION_ATTEMPTS }),
        ))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError> {
        Ok(self.links.get(slug).map(|entry| entry.value().clone()))
    }

    async fn increment_visits_if_active(&self, slug: &str) -> Result<Option<Link>, AppError> {
        let Some(mut entry) = self.links.get_mut(slug) else {
            return Ok(None);
        };

        // The shard write lock is held until `entry` drops.
        if !entry.is_active_at(Utc::now()) {
            return Ok(None);
        }

        entry.visits += 1;
        Ok(Some(entry.value().clone()))
    }

    async fn search(&self, query: &LinkQuery) -> Result<LinkPage, AppError> {
        let mut matches: Vec<Link> = self
            .links
            .iter()
            .filter(|entry| {
                contains_ignore_case(&entry.url, &query.search)
                    || contains_ignore_case(&entry.slug, &query.search)
            })
            .map(|entry| entry.value().clone())
            .collect();

        matches.sort_unstable_by_key(|link| link.id);

        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(query.offset.max(0) as usize)
            .take(query.limit.max(0) as usize)
            .collect();

        Ok(LinkPage { items, total })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
