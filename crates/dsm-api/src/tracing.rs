//! Log output setup.
//!
//! Development logs are pretty-printed with file and line; production logs
//! are one flattened JSON object per event. `RUST_LOG` replaces the default
//! directives of either mode.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Filter used when `RUST_LOG` is not set
pub const fn default_directives(env: Environment) -> &'static str {
    match env {
        Environment::Development => {
            "debug,dsm_api=debug,dsm_db=debug,tower_http=debug,tower_governor=info,sqlx=warn,lettre=info"
        }
        Environment::Production => "info,tower_http=info,tower_governor=warn,sqlx=warn",
    }
}

fn env_filter(env: Environment) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(env)))
}

/// Install the global subscriber for `env`
pub fn init_tracing(env: &Environment) {
    let filter = env_filter(*env);

    match env {
        Environment::Development => {
            let layer = tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .pretty()
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).init();
        }
        Environment::Production => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .with_filter(filter);
            tracing_subscriber::registry().with(layer).init();
        }
    }

    tracing::info!(environment = ?env, "Tracing initialized");
}
