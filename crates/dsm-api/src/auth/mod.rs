pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod routes;
pub mod service;

pub use middleware::{AuthAdmin, require_admin};
pub use routes::{protected_routes, public_routes};
