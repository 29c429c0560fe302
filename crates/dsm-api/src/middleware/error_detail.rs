//! Development-only error detail.
//!
//! Internal errors carry an [`ErrorReport`] extension with the underlying
//! error text. In development this middleware copies it into a `detail` field
//! of the JSON error body; in production the layer is not installed.

use axum::{
    body::Body,
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};

use crate::error::ErrorReport;

const MAX_ERROR_BODY: usize = 64 * 1024;

pub async fn error_detail_middleware(req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    let Some(ErrorReport(detail)) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };

    let (mut parts, body) = response.into_parts();
    let Ok(bytes) = axum::body::to_bytes(body, MAX_ERROR_BODY).await else {
        return Response::from_parts(parts, Body::empty());
    };

    let mut value: serde_json::Value = match serde_json::from_slice(&bytes) {
        Ok(value) => value,
        Err(_) => return Response::from_parts(parts, Body::from(bytes)),
    };

    if let Some(object) = value.as_object_mut() {
        object.insert("detail".to_string(), serde_json::Value::String(detail));
    }

    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(value.to_string()))
}
