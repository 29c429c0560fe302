pub mod auth;
pub mod candidate;
pub mod config;
pub mod dashboard;
pub mod email;
pub mod error;
pub mod exam;
pub mod extract;
pub mod instructor;
pub mod jobs;
pub mod metrics;
pub mod middleware;
pub mod pagination;
pub mod payment;
pub mod response;
pub mod router;
pub mod schedule;
pub mod settings;
pub mod state;
pub mod tracing;
pub mod v1;
pub mod validation;
pub mod vehicle;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig};
