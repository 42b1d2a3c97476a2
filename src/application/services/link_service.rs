//! Link creation, redirect resolution, and listing service.

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::domain::entities::{Link, LinkPage, LinkQuery, NewLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::slug::validate_custom_slug;
use crate::utils::url_validator::validate_url;

/// Largest page size accepted by [`LinkService::list_links`].
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Service enforcing the link business rules.
///
/// Stateless across calls: every operation re-reads from the repository, and
/// all cross-request synchronization is delegated to
/// [`LinkRepository::increment_visits_if_active`].
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    pub fn new(link_repository: Arc<L>) -> Self {
        Self { link_repository }
    }

    /// Creates a short link.
    ///
    /// The URL is stored exactly as given. An `expires_at` in the past is
    /// accepted; such a link answers every redirect with Gone.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the URL or custom slug is invalid.
    /// Returns [`AppError::Conflict`] if the custom slug already exists; nothing
    /// is written in that case.
    pub async fn create_link(
        &self,
        url: String,
        slug: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Link, AppError> {
        validate_url(&url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if let Some(custom) = &slug {
            validate_custom_slug(custom)?;

            if self.link_repository.find_by_slug(custom).await?.is_some() {
                return Err(slug_conflict(custom));
            }
        }

        if let Some(deadline) = expires_at
            && deadline <= Utc::now()
        {
            warn!(
                expires_at = %deadline,
                "Creating a link that is already expired; every redirect will answer 410 Gone"
            );
        }

        let new_link = NewLink {
            url,
            slug,
            // TIMESTAMPTZ keeps microseconds; every store sees the same instant.
            expires_at: expires_at.map(|at| at.trunc_subsecs(6)),
        };

        let link = self
            .link_repository
            .create(new_link)
            .await
            .map_err(|e| match e {
                // Lost a race against a concurrent create with the same slug.
                AppError::Conflict { details, .. } => {
                    AppError::conflict("Link with given slug already exists", details)
                }
                other => other,
            })?;

        info!(id = link.id, slug = %link.slug, "Link created");
        metrics::counter!("links_created_total").increment(1);

        Ok(link)
    }

    /// Resolves a slug for redirect, counting the visit.
    ///
    /// # Algorithm
    ///
    /// 1. Atomically increment the counter of an active link with this slug.
    /// 2. On a match, return the post-increment row.
    /// 3. On a miss, read the link without side effects to tell the cases apart:
    ///    absent means NotFound, present with an expiry means Gone.
    ///
    /// A link that is present with no expiry after a miss was inserted
    /// between the two steps; the increment is tried once more.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link was ever created under `slug`.
    /// Returns [`AppError::Gone`] if the link expired; its counter is untouched.
    pub async fn redirect_target(&self, slug: &str) -> Result<Link, AppError> {
        const MAX_ATTEMPTS: usize = 2;

        for _ in 0..MAX_ATTEMPTS {
            if let Some(link) = self.link_repository.increment_visits_if_active(slug).await? {
                debug!(slug, visits = link.visits, "Redirect");
                metrics::counter!("link_redirects_total", "outcome" => "success").increment(1);
                return Ok(link);
            }

            match self.link_repository.find_by_slug(slug).await? {
                None => break,
                // The store refused the increment, so by its clock this link is expired.
                Some(link) if link.expires_at.is_some() => {
                    debug!(slug, expires_at = ?link.expires_at, "Redirect to expired link");
                    metrics::counter!("link_redirects_total", "outcome" => "gone").increment(1);
                    return Err(AppError::gone(
                        format!("Link with slug '{slug}' expired."),
                        json!({ "slug": slug, "expires_at": link.expires_at }),
                    ));
                }
                Some(_) => continue,
            }
        }

        metrics::counter!("link_redirects_total", "outcome" => "not_found").increment(1);
        Err(AppError::not_found(
            format!("Link with slug '{slug}' has not been found"),
            json!({ "slug": slug }),
        ))
    }

    /// Retrieves a link by slug without counting a visit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link matches the slug.
    pub async fn get_link(&self, slug: &str) -> Result<Link, AppError> {
        self.link_repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| {
                AppError::not_found(
                    format!("Link with slug '{slug}' has not been found"),
                    json!({ "slug": slug }),
                )
            })
    }

    /// Lists links ordered by creation, filtered by a case-insensitive
    /// substring of `url` or `slug`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `offset` is negative or `limit` is
    /// outside `0..=MAX_PAGE_LIMIT`.
    pub async fn list_links(
        &self,
        search: &str,
        offset: i64,
        limit: i64,
    ) -> Result<LinkPage, AppError> {
        if offset < 0 {
            return Err(AppError::bad_request(
                "Offset must not be negative",
                json!({ "offset": offset }),
            ));
        }

        if !(0..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err(AppError::bad_request(
                format!("Limit must be between 0 and {MAX_PAGE_LIMIT}"),
                json!({ "limit": limit }),
            ));
        }

        let query = LinkQuery::new(search, offset, limit);
        self.link_repository.search(&query).await
    }

    /// Checks that the underlying store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.link_repository.ping().await
    }
}

fn slug_conflict(slug: &str) -> AppError {
    AppError::conflict(
        "Link with given slug already exists",
        json!({ "slug": slug }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use chrono::Duration;

    fn create_test_link(id: i64, slug: &str, url: &str, visits: i64) -> Link {
        Link::new(id, slug.to_string(), url.to_string(), None, visits)
    }

    fn service(repo: MockLinkRepository) -> LinkService<MockLinkRepository> {
        LinkService::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn test_create_link_with_custom_slug() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_find_by_slug()
            .withf(|slug| slug == "test-slug")
            .times(1)
            .returning(|_| Ok(None));

        let created = create_test_link(1, "test-slug", "https://example.com/long-url", 0);
        mock_repo
            .expect_create()
            .withf(|new_link| {
                new_link.slug.as_deref() == Some("test-slug")
                    && new_link.url == "https://example.com/long-url"
                    && new_link.expires_at.is_none()
            })
            .times(1)
            .returning(move |_| Ok(created.clone()));

        let link = service(mock_repo)
            .create_link(
                "https://example.com/long-url".to_string(),
                Some("test-slug".to_string()),
                None,
            )
            .await
            .unwrap();

        assert_eq!(link.slug, "test-slug");
        assert_eq!(link.visits, 0);
    }

    #[tokio::test]
    async fn test_create_link_without_slug_skips_lookup() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo.expect_find_by_slug().times(0);

        let created = create_test_link(7, "a2b3c4", "https://example.com", 0);
        mock_repo
            .expect_create()
            .withf(|new_link| new_link.slug.is_none())
            .times(1)
            .returning(move |_| Ok(created.clone()));

        let link = service(mock_repo)
            .create_link("https://example.com".to_string(), None, None)
            .await
            .unwrap();

        assert_eq!(link.slug, "a2b3c4");
    }

    #[tokio::test]
    async fn test_create_link_slug_conflict() {
        let mut mock_repo = MockLinkRepository::new();

        let existing = create_test_link(5, "taken", "https://other.com", 3);
        mock_repo
            .expect_find_by_slug()
            .withf(|slug| slug == "taken")
            .times(1)
            .returning(move |_| Ok(Some(existing.clone())));

        mock_repo.expect_create().times(0);

        let err = service(mock_repo)
            .create_link(
                "https://example.com".to_string(),
                Some("taken".to_string()),
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.to_string(), "Link with given slug already exists");
    }

    #[tokio::test]
    async fn test_create_link_insert_race_is_conflict() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo.expect_find_by_slug().returning(|_| Ok(None));
        mock_repo.expect_create().times(1).returning(|_| {
            Err(AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": "links_slug_key" }),
            ))
        });

        let err = service(mock_repo)
            .create_link(
                "https://example.com".to_string(),
                Some("racer".to_string()),
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict { .. }));
        assert_eq!(err.to_string(), "Link with given slug already exists");
    }

    #[tokio::test]
    async fn test_create_link_invalid_url() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_slug().times(0);
        mock_repo.expect_create().times(0);

        let err = service(mock_repo)
            .create_link("not-a-url".to_string(), None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_link_invalid_slug() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_slug().times(0);
        mock_repo.expect_create().times(0);

        let err = service(mock_repo)
            .create_link(
                "https://example.com".to_string(),
                Some("bad slug".to_string()),
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_create_link_allows_past_expiry() {
        let mut mock_repo = MockLinkRepository::new();
        let past = (Utc::now() - Duration::days(1)).trunc_subsecs(6);

        mock_repo
            .expect_create()
            .withf(move |new_link| new_link.expires_at == Some(past))
            .times(1)
            .returning(|new_link| Ok(new_link.into_link(1, "gen123".to_string())));

        let link = service(mock_repo)
            .create_link("https://www.google.pl".to_string(), None, Some(past))
            .await
            .unwrap();

        assert_eq!(link.expires_at, Some(past));
        assert_eq!(link.visits, 0);
    }

    #[tokio::test]
    async fn test_create_link_truncates_expiry_to_micros() {
        let mut mock_repo = MockLinkRepository::new();
        let precise = DateTime::parse_from_rfc3339("2099-01-01T00:00:00.123456789Z")
            .unwrap()
            .with_timezone(&Utc);
        let expected = DateTime::parse_from_rfc3339("2099-01-01T00:00:00.123456Z")
            .unwrap()
            .with_timezone(&Utc);

        mock_repo
            .expect_create()
            .withf(move |new_link| new_link.expires_at == Some(expected))
            .times(1)
            .returning(|new_link| Ok(new_link.into_link(1, "gen123".to_string())));

        let link = service(mock_repo)
            .create_link("https://example.com".to_string(), None, Some(precise))
            .await
            .unwrap();

        assert_eq!(link.expires_at, Some(expected));
    }

    #[tokio::test]
    async fn test_create_link_rejects_control_characters() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_slug().times(0);
        mock_repo.expect_create().times(0);

        let err = service(mock_repo)
            .create_link("https://example.com/a\nb".to_string(), None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_redirect_active_link() {
        let mut mock_repo = MockLinkRepository::new();

        let visited = create_test_link(2, "redirect-slug", "https://redirect.com", 11);
        mock_repo
            .expect_increment_visits_if_active()
            .withf(|slug| slug == "redirect-slug")
            .times(1)
            .returning(move |_| Ok(Some(visited.clone())));

        mock_repo.expect_find_by_slug().times(0);

        let link = service(mock_repo)
            .redirect_target("redirect-slug")
            .await
            .unwrap();

        assert_eq!(link.url, "https://redirect.com");
        assert_eq!(link.visits, 11);
    }

    #[tokio::test]
    async fn test_redirect_not_found() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_increment_visits_if_active()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_find_by_slug()
            .withf(|slug| slug == "missing")
            .times(1)
            .returning(|_| Ok(None));

        let err = service(mock_repo)
            .redirect_target("missing")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.to_string(), "Link with slug 'missing' has not been found");
    }

    #[tokio::test]
    async fn test_redirect_expired_link_is_gone() {
        let mut mock_repo = MockLinkRepository::new();

        let mut expired = create_test_link(3, "old", "https://example.com", 4);
        expired.expires_at = Some(Utc::now() - Duration::hours(1));

        mock_repo
            .expect_increment_visits_if_active()
            .times(1)
            .returning(|_| Ok(None));
        mock_repo
            .expect_find_by_slug()
            .times(1)
            .returning(move |_| Ok(Some(expired.clone())));

        let err = service(mock_repo).redirect_target("old").await.unwrap_err();

        assert!(matches!(err, AppError::Gone { .. }));
        assert_eq!(err.to_string(), "Link with slug 'old' expired.");
    }

    #[tokio::test]
    async fn test_redirect_retries_when_link_appears_between_steps() {
        let mut mock_repo = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();

        mock_repo
            .expect_increment_visits_if_active()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(None));

        let fresh = create_test_link(9, "fresh", "https://example.com", 0);
        mock_repo
            .expect_find_by_slug()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(fresh.clone())));

        let visited = create_test_link(9, "fresh", "https://example.com", 1);
        mock_repo
            .expect_increment_visits_if_active()
            .times(1)
            .in_sequence(&mut seq)
            .returning(move |_| Ok(Some(visited.clone())));

        let link = service(mock_repo).redirect_target("fresh").await.unwrap();
        assert_eq!(link.visits, 1);
    }

    #[tokio::test]
    async fn test_redirect_gives_up_after_retry() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_increment_visits_if_active()
            .times(2)
            .returning(|_| Ok(None));

        let row = create_test_link(9, "odd", "https://example.com", 0);
        mock_repo
            .expect_find_by_slug()
            .times(2)
            .returning(move |_| Ok(Some(row.clone())));

        let err = service(mock_repo).redirect_target("odd").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_redirect_propagates_store_failure() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_increment_visits_if_active()
            .times(1)
            .returning(|_| Err(AppError::unavailable("Link store unavailable", json!({}))));
        mock_repo.expect_find_by_slug().times(0);

        let err = service(mock_repo).redirect_target("any").await.unwrap_err();
        assert!(matches!(err, AppError::StoreUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_list_links_passes_query() {
        let mut mock_repo = MockLinkRepository::new();

        mock_repo
            .expect_search()
            .withf(|query| query.search == "test" && query.offset == 0 && query.limit == 5)
            .times(1)
            .returning(|_| {
                Ok(LinkPage {
                    items: vec![Link::new(1, "s1".to_string(), "url1".to_string(), None, 1)],
                    total: 10,
                })
            });

        let page = service(mock_repo).list_links("test", 0, 5).await.unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total, 10);
    }

    #[tokio::test]
    async fn test_list_links_rejects_negative_offset() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_search().times(0);

        let err = service(mock_repo).list_links("", -1, 10).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_list_links_rejects_oversized_limit() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_search().times(0);

        let svc = service(mock_repo);
        assert!(svc.list_links("", 0, MAX_PAGE_LIMIT + 1).await.is_err());
        assert!(svc.list_links("", 0, -5).await.is_err());
    }
}
