//! Domain types and rules shared by every storyreel crate.
//!
//! Nothing in here performs I/O. The persistence seam is expressed as the
//! [`persistence::ProjectPersistence`] trait and implemented elsewhere.

pub mod assembly;
pub mod error;
pub mod persistence;
pub mod project;
pub mod types;
pub mod validation;
pub mod visual_style;
