//! Request extractors shared by the handlers.
//!
//! - [`auth::AuthUser`] -- the authenticated owner from a JWT Bearer token.

pub mod auth;
