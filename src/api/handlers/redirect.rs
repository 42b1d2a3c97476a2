//! Handler for short link redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a slug to its destination URL, counting the visit.
///
/// # Endpoint
///
/// `GET /links/{slug}`
///
/// # Response Codes
///
/// - **302 Found**: `Location` is the destination; the visit was counted
/// - **404 Not Found**: no link was ever created under this slug
/// - **410 Gone**: the link expired; the visit was not counted
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.redirect_target(&slug).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, link.url)]))
}
