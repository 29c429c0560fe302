use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
};

use crate::{
    auth, candidate, dashboard, exam, instructor,
    middleware::rate_limit::rate_limit_envelope,
    payment, rate_limit_layer, schedule, settings,
    state::ApiState,
    vehicle,
};

/// V1 API routes.
///
/// Everything except the public auth endpoints requires an admin bearer
/// token. The whole tree shares the generic API rate limit.
pub fn routes(state: &ApiState) -> Router<ApiState> {
    let protected = Router::new()
        .merge(auth::protected_routes())
        .merge(candidate::routes())
        .merge(instructor::routes())
        .merge(vehicle::routes())
        .merge(schedule::routes())
        .merge(payment::routes())
        .merge(exam::routes())
        .merge(dashboard::routes())
        .merge(settings::routes())
        .route_layer(from_fn_with_state(state.clone(), auth::require_admin));

    Router::new()
        .merge(auth::public_routes(&state.rate_limits))
        .merge(protected)
        .layer(rate_limit_layer!(state.rate_limits.api))
        .layer(from_fn(rate_limit_envelope))
}
