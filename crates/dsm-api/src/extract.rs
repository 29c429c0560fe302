//! Request extractors that turn malformed input into 400 responses.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, OptionalFromRequest, Path, Query, Request},
    http::{header, request::Parts},
};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ApiError;

/// Payload-level normalization and validation run before a handler sees the body
pub trait ValidatePayload {
    /// Trim and canonicalize fields in place
    fn normalize(&mut self) {}

    fn validate(&self) -> Result<(), ApiError>;
}

/// JSON body that has been deserialized, normalized and validated
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + ValidatePayload,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut payload) = <Json<T> as FromRequest<S>>::from_request(req, state).await?;
        payload.normalize();
        payload.validate()?;
        Ok(Self(payload))
    }
}

/// A request without a `Content-Type` yields `None`, so action endpoints
/// can take an optional body
impl<S, T> OptionalFromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + ValidatePayload,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        if !req.headers().contains_key(header::CONTENT_TYPE) {
            return Ok(None);
        }
        <Self as FromRequest<S>>::from_request(req, state)
            .await
            .map(Some)
    }
}

/// UUID taken from the `{id}` path segment
#[derive(Debug, Clone, Copy)]
pub struct ResourceId(pub Uuid);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state).await?;
        Ok(Self(id))
    }
}

/// Query string parameters, rejected with 400 when they fail to parse
#[derive(Debug, Clone)]
pub struct ListQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ListQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<T>::try_from_uri(&parts.uri)?;
        Ok(Self(query))
    }
}
