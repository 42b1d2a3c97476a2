//! Repository trait for link storage.

use crate::domain::entities::{Link, LinkPage, LinkQuery, NewLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Storage contract for links.
///
/// The store is the single source of truth and the only synchronization
/// point between concurrent requests: the service layer holds no state, so
/// every guarantee about concurrent visits rests on
/// [`LinkRepository::increment_visits_if_active`].
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link and returns the stored row with `visits = 0`.
    ///
    /// When `new_link.slug` is `None` a random slug is generated; on a
    /// uniqueness collision a fresh one is tried, up to
    /// [`crate::utils::slug::MAX_GENERATION_ATTEMPTS`] times.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if a client-supplied slug is already taken.
    /// Returns [`AppError::Internal`] if no free slug could be generated.
    /// Returns [`AppError::StoreUnavailable`] if the store cannot be reached.
    async fn create(&self, new_link: NewLink) -> Result<Link, AppError>;

    /// Finds a link by slug. No side effects.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if found, expired or not
    /// - `Ok(None)` if no link was ever created under `slug`
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, AppError>;

    /// Atomically increments `visits` of an active link and returns the
    /// post-increment row.
    ///
    /// Matching the slug, checking `expires_at IS NULL OR expires_at > now`
    /// and incrementing happen as one indivisible step with respect to other
    /// callers on the same row.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Link))` if an active link matched and was incremented
    /// - `Ok(None)` if the slug is absent or expired; nothing is mutated
    async fn increment_visits_if_active(&self, slug: &str) -> Result<Option<Link>, AppError>;

    /// Lists links matching `query.search` ordered by id ascending, with the
    /// total number of matches regardless of pagination.
    async fn search(&self, query: &LinkQuery) -> Result<LinkPage, AppError>;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;
}
