//! Authentication primitives.
//!
//! - [`jwt`] -- HS256 access-token generation and validation. Tokens are
//!   issued by the identity provider; generation exists for tooling and tests.

pub mod jwt;
