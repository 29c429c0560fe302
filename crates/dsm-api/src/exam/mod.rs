pub mod courses;
pub mod model;
pub mod routes;

use axum::Router;

use crate::ApiState;

pub fn routes() -> Router<ApiState> {
    Router::new()
        .merge(courses::routes())
        .merge(routes::routes())
}
