//! DTOs for link endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::{Link, LinkPage};

/// Request body for `POST /links`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLinkRequest {
    /// The destination URL (must be a valid absolute URL).
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Optional custom slug; generated when absent. Checked by the service.
    pub slug: Option<String>,

    /// Optional RFC 3339 expiry. After this instant the link answers 410 Gone.
    #[serde(default, alias = "expires_at")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// JSON representation of a link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkResponse {
    pub id: i64,
    pub url: String,
    pub slug: String,
    pub visits: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            url: link.url,
            slug: link.slug,
            visits: link.visits,
            expires_at: link.expires_at,
        }
    }
}

/// Response body for `GET /links`.
#[derive(Debug, Serialize)]
pub struct LinkListResponse {
    pub items: Vec<LinkResponse>,
    /// Number of all matching links, regardless of pagination.
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl LinkListResponse {
    pub fn new(page: LinkPage, offset: i64, limit: i64) -> Self {
        Self {
            items: page.items.into_iter().map(LinkResponse::from).collect(),
            total: page.total,
            limit,
            offset,
        }
    }
}
