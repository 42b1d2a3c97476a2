//! Core domain entities.
//!
//! - [`Link`] - A shortened URL with its visit counter
//! - [`NewLink`] - Input for creating a link
//! - [`LinkQuery`] / [`LinkPage`] - Search and pagination input and output

pub mod link;

pub use link::{Link, LinkPage, LinkQuery, NewLink};
