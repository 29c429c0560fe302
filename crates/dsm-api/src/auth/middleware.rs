use axum::{
    extract::{FromRef, FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use dsm_db::{models::Admin, repositories::admin};
use sqlx::PgPool;

use super::jwt::{TokenKind, verify_token};
use crate::{error::ApiError, state::AuthConfig};

/// Authenticated admin extractor
///
/// Reads the principal stored by [`require_admin`] when the route sits behind
/// it, otherwise verifies the `Authorization: Bearer` token itself and loads
/// the admin. Every failure is a 401.
///
/// # Example
/// ```
/// use dsm_api::{auth::AuthAdmin, error::ApiError};
///
/// async fn protected_route(AuthAdmin(admin): AuthAdmin) -> Result<String, ApiError> {
///     Ok(admin.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthAdmin(pub Admin);

impl<S> FromRequestParts<S> for AuthAdmin
where
    AuthConfig: FromRef<S>,
    PgPool: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(admin) = parts.extensions.get::<AuthAdmin>() {
            return Ok(admin.clone());
        }

        let auth_config = AuthConfig::from_ref(state);

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::unauthorized())?;

        let claims = verify_token(bearer.token(), &auth_config.jwt_secret, TokenKind::Access)?;
        let admin_id = claims.admin_id()?;

        let pool = PgPool::from_ref(state);
        let admin = admin::find_by_id(&pool, admin_id).await?.ok_or_else(|| {
            tracing::warn!(%admin_id, "Valid token for an admin that no longer exists");
            ApiError::unauthorized()
        })?;

        Ok(AuthAdmin(admin))
    }
}

/// Reject unauthenticated requests before they reach the handlers
///
/// Install with `middleware::from_fn_with_state`; the loaded admin is stored
/// in the request extensions for [`AuthAdmin`] to pick up.
pub async fn require_admin(admin: AuthAdmin, mut req: Request, next: Next) -> Response {
    req.extensions_mut().insert(admin);
    next.run(req).await
}
