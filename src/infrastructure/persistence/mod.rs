//! Link store implementations.
//!
//! - [`PgLinkRepository`] - PostgreSQL via SQLx; atomicity from single-statement updates
//! - [`InMemoryLinkRepository`] - In-process store; atomicity from DashMap shard locks

pub mod memory_link_repository;
pub mod pg_link_repository;

pub use memory_link_repository::InMemoryLinkRepository;
pub use pg_link_repository::PgLinkRepository;
