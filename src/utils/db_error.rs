//! Classification of SQLx errors.

/// Name of the unique constraint guarding `links.slug`.
pub const SLUG_UNIQUE_CONSTRAINT: &str = "links_slug_key";

/// Returns true if the error is a unique violation on the slug column.
pub fn is_unique_violation_on_slug(e: &sqlx::Error) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    matches!(db_err.constraint(), Some(SLUG_UNIQUE_CONSTRAINT))
}

/// Returns true if the error means the store could not be reached,
/// as opposed to the store rejecting the statement.
pub fn is_unavailable(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::WorkerCrashed
    )
}
