pub mod enrollments;
pub mod installments;
pub mod model;
pub mod plans;
pub mod routes;

use axum::Router;

use crate::ApiState;

/// Payments, payment plans and enrollments
pub fn routes() -> Router<ApiState> {
    Router::new()
        .merge(plans::routes())
        .merge(enrollments::routes())
        .merge(routes::routes())
}
