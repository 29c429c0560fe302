//! Prometheus exporter, HTTP request instrumentation and a few domain counters.
//!
//! Request metrics are labelled by method, route shape and status. Ids in the
//! path are folded into `:id` so that each candidate or lesson does not create
//! its own series.

use std::{sync::LazyLock, time::Instant};

use axum::{
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use regex::Regex;

use crate::{error::ApiError, state::ApiState};

const REQUESTS_TOTAL: &str = "dsm_http_requests_total";
const REQUEST_SECONDS: &str = "dsm_http_request_duration_seconds";
const REQUESTS_IN_FLIGHT: &str = "dsm_http_requests_in_flight";

const LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

static ID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"/(?:[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}|\d+)(/|$)",
    )
    .expect("valid id segment regex")
});

/// Install the global recorder and return the handle `/metrics` renders from
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(Matcher::Full(REQUEST_SECONDS.to_string()), LATENCY_BUCKETS)?
        .install_recorder()?;

    Ok(handle)
}

/// Route shape used as the `path` label
fn route_label(path: &str) -> String {
    // Applied twice because adjacent ids share the separating slash
    let once = ID_SEGMENT.replace_all(path, "/:id$1");
    ID_SEGMENT.replace_all(&once, "/:id$1").into_owned()
}

pub async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().as_str().to_owned();
    let path = route_label(req.uri().path());

    let in_flight = gauge!(REQUESTS_IN_FLIGHT, "method" => method.clone(), "path" => path.clone());
    in_flight.increment(1.0);
    let started = Instant::now();

    let response = next.run(req).await;

    let elapsed = started.elapsed().as_secs_f64();
    in_flight.decrement(1.0);

    let status = response.status().as_u16().to_string();
    counter!(
        REQUESTS_TOTAL,
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.clone()
    )
    .increment(1);
    histogram!(REQUEST_SECONDS, "method" => method, "path" => path, "status" => status)
        .record(elapsed);

    response
}

/// `GET /metrics`; 404 when the exporter was not installed
pub async fn metrics_handler(State(state): State<ApiState>) -> Result<Response, ApiError> {
    let Some(handle) = state.metrics.as_ref() else {
        return Err(ApiError::NotFound("Metrics exporter is not enabled".to_string()));
    };

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}

const fn outcome(success: bool) -> &'static str {
    if success { "success" } else { "failure" }
}

/// Login and password reset attempts
pub fn record_auth_event(event: &'static str, success: bool) {
    counter!("dsm_auth_events_total", "event" => event, "outcome" => outcome(success)).increment(1);
}

/// Outgoing notification emails
pub fn record_email_event(kind: &'static str, success: bool) {
    counter!("dsm_emails_sent_total", "kind" => kind, "outcome" => outcome(success)).increment(1);
}

/// Installments flipped to overdue by the daily sweep
pub fn record_overdue_payments(count: u64) {
    counter!("dsm_payments_marked_overdue_total").increment(count);
}
