//! JSON body extractor whose rejections use the API error envelope.

use axum::extract::FromRequest;

use crate::error::AppError;

/// Drop-in replacement for [`axum::Json`] as an extractor. Malformed bodies
/// are rejected as `400 BAD_REQUEST` with the usual `{ error, code }` body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
