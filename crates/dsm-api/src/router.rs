use std::any::Any;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::{
    catch_panic::CatchPanicLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    error::ApiError,
    metrics::{metrics_handler, track_metrics},
    middleware::{
        cors::create_cors_layer, error_detail::error_detail_middleware,
        request_id::request_id_middleware, security_headers::apply_security_headers,
    },
    response::ApiResponse,
    state::ApiState,
    v1,
};

const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Full application: health, metrics, the v1 API and the global middleware
/// stack.
pub fn router(state: ApiState) -> Router {
    let environment = state.environment;
    let cors = create_cors_layer(state.allowed_origins.clone());

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .nest("/api/v1", v1::routes(&state))
        .fallback(handler_404)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handle_panic));

    if environment.is_development() {
        app = app.layer(from_fn(error_detail_middleware));
    }

    apply_security_headers(app, environment)
        .layer(from_fn(track_metrics))
        .layer(cors)
        .layer(trace_layer)
        .layer(from_fn(request_id_middleware))
}

async fn health() -> ApiResponse<Health> {
    ApiResponse::ok(Health {
        status: "ok",
        timestamp: Utc::now(),
    })
}

async fn handler_404() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "unknown panic".to_string()
    };

    tracing::error!(panic = %detail, "Handler panicked");
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}
