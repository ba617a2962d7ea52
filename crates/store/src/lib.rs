//! Client-side project state.
//!
//! - [`store::ProjectStore`] -- the in-memory authority for the signed-in
//!   owner's projects, with optimistic updates and rollback.
//! - [`studio::Studio`] -- the production workflow (analysis, storyboard,
//!   scenes, video) built on the store and the AI flows.
//! - [`memory::MemoryRemote`] and [`http::HttpRemote`] -- persistence
//!   backends for offline use and for talking to the API server.

pub mod http;
pub mod memory;
pub mod store;
pub mod studio;

pub use memory::MemoryRemote;
pub use store::ProjectStore;
pub use studio::Studio;
