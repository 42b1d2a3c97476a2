//! Utility functions for slug handling, URL validation, and storage errors.
//!
//! - [`slug`] - Random slug generation and custom slug validation
//! - [`url_validator`] - Destination URL validation
//! - [`search`] - Search term escaping for `ILIKE` patterns
//! - [`db_error`] - Classification of SQLx errors

pub mod db_error;
pub mod search;
pub mod slug;
pub mod url_validator;
