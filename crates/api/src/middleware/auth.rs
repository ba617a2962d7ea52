//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use storyreel_core::error::CoreError;
use storyreel_core::types::OwnerId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated owner extracted from the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(owner_id = %user.owner_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The owner id (from `claims.sub`).
    pub owner_id: OwnerId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(auth_header) = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
        else {
            tracing::debug!("Missing Authorization header");
            return Err(AppError::Core(CoreError::NotAuthenticated));
        };

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            tracing::debug!("Authorization header is not a Bearer token");
            return Err(AppError::Core(CoreError::NotAuthenticated));
        };

        let claims = validate_token(token, &state.config.jwt).map_err(|e| {
            tracing::debug!(error = %e, "Rejected access token");
            AppError::Core(CoreError::NotAuthenticated)
        })?;

        if claims.sub.is_empty() {
            return Err(AppError::Core(CoreError::NotAuthenticated));
        }

        Ok(AuthUser {
            owner_id: claims.sub,
        })
    }
}
