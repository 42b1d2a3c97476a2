//! Shared application state injected into all handlers.

use std::sync::Arc;

use crate::application::services::LinkService;
use crate::domain::repositories::LinkRepository;

/// Link service over whichever store backend is configured.
pub type DynLinkService = LinkService<dyn LinkRepository>;

/// State shared by all handlers.
///
/// Holds no per-request or cached link data: every handler goes through the
/// service to the store.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    /// Page size used by `GET /links` when `limit` is omitted.
    pub default_page_limit: i64,
}

impl AppState {
    /// Creates application state over the given link store.
    pub fn new(link_repository: Arc<dyn LinkRepository>, default_page_limit: i64) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(link_repository)),
            default_page_limit,
        }
    }
}
