//! Link API route configuration.

use crate::api::handlers::{create_link_handler, list_links_handler, redirect_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Routes of the link API.
///
/// # Endpoints
///
/// - `POST /links`        - Create a short link
/// - `GET  /links`        - List links (search + pagination)
/// - `GET  /links/{slug}` - Redirect to the original URL, counting the visit
pub fn link_routes() -> Router<AppState> {
    Router::new()
        .route("/links", get(list_links_handler).post(create_link_handler))
        .route("/links/{slug}", get(redirect_handler))
}
