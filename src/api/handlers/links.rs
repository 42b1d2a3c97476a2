//! Handlers for link creation and listing.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::link::{CreateLinkRequest, LinkListResponse, LinkResponse};
use crate::api::dto::pagination::ListLinksParams;
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /links`
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/long-url",
///   "slug": "my-link",                     // optional
///   "expiresAt": "2026-12-31T23:59:59Z"    // optional
/// }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "id": 1, "url": "https://example.com/long-url", "slug": "my-link", "visits": 0, "expiresAt": "2026-12-31T23:59:59Z" }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request for a malformed body, URL, slug or timestamp.
/// Returns 409 Conflict if the slug is already taken.
pub async fn create_link_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreateLinkRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let link = state
        .link_service
        .create_link(payload.url, payload.slug, payload.expires_at)
        .await?;

    Ok((StatusCode::CREATED, Json(link.into())))
}

/// Lists links with search and pagination.
///
/// # Endpoint
///
/// `GET /links?search=&offset=&limit=`
///
/// # Query Parameters
///
/// - `search` (optional): case-insensitive substring of URL or slug (default: empty, no filter)
/// - `offset` (optional): number of matches to skip (default: 0)
/// - `limit` (optional): page size (default: `DEFAULT_PAGE_LIMIT`, max: 1000)
///
/// # Response
///
/// ```json
/// { "items": [ ... ], "total": 15, "limit": 10, "offset": 0 }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if offset or limit are malformed or out of range.
pub async fn list_links_handler(
    State(state): State<AppState>,
    params: Result<Query<ListLinksParams>, QueryRejection>,
) -> Result<Json<LinkListResponse>, AppError> {
    let Query(params) = params?;
    let (search, offset, limit) = params.resolve(state.default_page_limit);

    let page = state
        .link_service
        .list_links(&search, offset, limit)
        .await?;

    Ok(Json(LinkListResponse::new(page, offset, limit)))
}
