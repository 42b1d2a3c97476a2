//! Query parameters for listing links.

use serde::Deserialize;
use serde_with::{DisplayFromStr, serde_as};

/// Query parameters of `GET /links`.
///
/// Uses `serde_with` to parse numbers from query strings.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct ListLinksParams {
    #[serde(default)]
    pub search: Option<String>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub offset: Option<i64>,

    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(default)]
    pub limit: Option<i64>,
}

impl ListLinksParams {
    /// Applies defaults: empty search, offset 0, `default_limit`.
    ///
    /// Range checks are left to the service.
    pub fn resolve(self, default_limit: i64) -> (String, i64, i64) {
        (
            self.search.unwrap_or_default(),
            self.offset.unwrap_or(0),
            self.limit.unwrap_or(default_limit),
        )
    }
}
