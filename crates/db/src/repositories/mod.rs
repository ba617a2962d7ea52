//! Repository layer.
//!
//! Each repository wraps a `PgPool` and implements one of the persistence
//! traits from `storyreel_core`.

pub mod project_repo;

pub use project_repo::PgProjectRepo;
