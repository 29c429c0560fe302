use axum::extract::FromRef;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use crate::{
    ApiConfig,
    config::Environment,
    email::EmailService,
    middleware::rate_limit::{RateLimitRule, RateLimitSettings},
    pagination::PaginationSettings,
};

#[derive(Clone)]
pub struct ApiState {
    pub pool: PgPool,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub reset_token_expiry_minutes: i64,
    pub bcrypt_cost: u32,
    pub frontend_url: String,
    pub allowed_origins: Vec<String>,
    pub environment: Environment,
    pub pagination: PaginationSettings,
    pub rate_limits: RateLimitSettings,
    pub email_service: Option<EmailService>,
    pub metrics: Option<PrometheusHandle>,
}

impl std::fmt::Debug for ApiState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiState")
            .field("environment", &self.environment)
            .field("frontend_url", &self.frontend_url)
            .field("pagination", &self.pagination)
            .field("rate_limits", &self.rate_limits)
            .field("email_service", &self.email_service.is_some())
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

impl ApiState {
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        // Initialize email service if SMTP is configured
        let email_service = if let (Some(host), Some(username), Some(password), Some(from_email)) = (
            config.smtp_host.as_ref(),
            config.smtp_username.as_ref(),
            config.smtp_password.as_ref(),
            config.smtp_from_email.as_ref(),
        ) {
            let from_name = config
                .smtp_from_name
                .as_deref()
                .unwrap_or("Driving School");
            match EmailService::new(
                host,
                config.smtp_port,
                username,
                password,
                from_email,
                from_name,
                &config.frontend_url,
            ) {
                Ok(service) => Some(service),
                Err(e) => {
                    tracing::error!("Failed to initialize email service: {e}");
                    None
                }
            }
        } else {
            tracing::warn!("Email service not configured (missing SMTP environment variables)");
            None
        };

        let allowed_origins = config.allowed_origins();

        Self {
            pool,
            jwt_secret: config.jwt_secret,
            jwt_expiry_hours: config.jwt_expiry_hours,
            reset_token_expiry_minutes: config.reset_token_expiry_minutes,
            bcrypt_cost: config.bcrypt_cost,
            frontend_url: config.frontend_url,
            allowed_origins,
            environment: config.env,
            pagination: PaginationSettings {
                default_limit: config.pagination_default_limit,
                max_limit: config.pagination_max_limit,
            },
            rate_limits: RateLimitSettings {
                login: RateLimitRule::new(
                    config.login_rate_limit_max,
                    config.login_rate_limit_window_secs,
                ),
                password_reset: RateLimitRule::new(
                    config.reset_rate_limit_max,
                    config.reset_rate_limit_window_secs,
                ),
                api: RateLimitRule::new(
                    config.api_rate_limit_max,
                    config.api_rate_limit_window_secs,
                ),
            },
            email_service,
            metrics: None,
        }
    }

    /// Attach the Prometheus handle rendered by `GET /metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Subset of the state needed to issue and verify tokens
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub reset_token_expiry_minutes: i64,
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            jwt_secret: state.jwt_secret.clone(),
            jwt_expiry_hours: state.jwt_expiry_hours,
            reset_token_expiry_minutes: state.reset_token_expiry_minutes,
        }
    }
}

impl FromRef<ApiState> for PgPool {
    fn from_ref(state: &ApiState) -> Self {
        state.pool.clone()
    }
}
