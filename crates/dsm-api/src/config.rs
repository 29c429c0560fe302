use serde::Deserialize;
use thiserror::Error;

/// Deployment environment, read from `APP_ENV`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    #[serde(alias = "dev")]
    Development,
    #[serde(alias = "prod")]
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration loaded from environment variables.
///
/// Field names map to upper-cased variables (`jwt_secret` reads `JWT_SECRET`).
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    pub database_url: String,
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    pub jwt_secret: String,
    #[serde(default = "default_jwt_expiry_hours")]
    pub jwt_expiry_hours: i64,
    #[serde(default = "default_reset_token_expiry_minutes")]
    pub reset_token_expiry_minutes: i64,
    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default, rename = "app_env")]
    pub env: Environment,

    #[serde(default = "default_frontend_url")]
    pub cors_origins: String,
    #[serde(default = "default_frontend_url")]
    pub frontend_url: String,

    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from_email: Option<String>,
    pub smtp_from_name: Option<String>,

    #[serde(default = "default_pagination_limit")]
    pub pagination_default_limit: i64,
    #[serde(default = "default_pagination_max_limit")]
    pub pagination_max_limit: i64,

    #[serde(default = "default_login_rate_limit_max")]
    pub login_rate_limit_max: u32,
    #[serde(default = "default_login_rate_limit_window")]
    pub login_rate_limit_window_secs: u64,
    #[serde(default = "default_reset_rate_limit_max")]
    pub reset_rate_limit_max: u32,
    #[serde(default = "default_reset_rate_limit_window")]
    pub reset_rate_limit_window_secs: u64,
    #[serde(default = "default_api_rate_limit_max")]
    pub api_rate_limit_max: u32,
    #[serde(default = "default_api_rate_limit_window")]
    pub api_rate_limit_window_secs: u64,

    pub admin_email: Option<String>,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    pub admin_password: Option<String>,
}

fn default_db_max_connections() -> u32 {
    10
}

fn default_jwt_expiry_hours() -> i64 {
    24
}

fn default_reset_token_expiry_minutes() -> i64 {
    60
}

fn default_bcrypt_cost() -> u32 {
    12
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_frontend_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_pagination_limit() -> i64 {
    10
}

fn default_pagination_max_limit() -> i64 {
    100
}

fn default_login_rate_limit_max() -> u32 {
    5
}

fn default_login_rate_limit_window() -> u64 {
    15 * 60
}

fn default_reset_rate_limit_max() -> u32 {
    3
}

fn default_reset_rate_limit_window() -> u64 {
    60 * 60
}

fn default_api_rate_limit_max() -> u32 {
    200
}

fn default_api_rate_limit_window() -> u64 {
    15 * 60
}

fn default_admin_username() -> String {
    "admin".to_string()
}

impl ApiConfig {
    /// Load and validate configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config: Self = envy::from_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from explicit key/value pairs (keys in upper case).
    pub fn from_pairs<I>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::from_iter(pairs)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid(
                "JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "BCRYPT_COST must be between 4 and 31".to_string(),
            ));
        }

        if self.jwt_expiry_hours <= 0 || self.reset_token_expiry_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "token lifetimes must be positive".to_string(),
            ));
        }

        if self.db_max_connections == 0 {
            return Err(ConfigError::Invalid(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }

        if self.pagination_default_limit < 1
            || self.pagination_default_limit > self.pagination_max_limit
        {
            return Err(ConfigError::Invalid(
                "PAGINATION_DEFAULT_LIMIT must be between 1 and PAGINATION_MAX_LIMIT".to_string(),
            ));
        }

        let limits = [
            ("LOGIN", self.login_rate_limit_max, self.login_rate_limit_window_secs),
            ("RESET", self.reset_rate_limit_max, self.reset_rate_limit_window_secs),
            ("API", self.api_rate_limit_max, self.api_rate_limit_window_secs),
        ];
        for (name, max, window) in limits {
            if max == 0 || window == 0 {
                return Err(ConfigError::Invalid(format!(
                    "{name}_RATE_LIMIT_MAX and {name}_RATE_LIMIT_WINDOW_SECS must be positive"
                )));
            }
        }

        if self.allowed_origins().is_empty() {
            return Err(ConfigError::Invalid(
                "CORS_ORIGINS must list at least one origin".to_string(),
            ));
        }

        Ok(())
    }

    /// Origins from the comma-separated `CORS_ORIGINS`
    pub fn allowed_origins(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(extra: &[(&str, &str)]) -> Vec<(String, String)> {
        let mut vars = vec![
            ("DATABASE_URL", "postgres://localhost/dsm"),
            ("JWT_SECRET", "test_jwt_secret_minimum_32_characters_long"),
        ];
        vars.extend_from_slice(extra);
        vars.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::from_pairs(pairs(&[])).expect("config should load");

        assert_eq!(config.port, 5000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.env, Environment::Development);
        assert_eq!(config.jwt_expiry_hours, 24);
        assert_eq!(config.reset_token_expiry_minutes, 60);
        assert_eq!(config.pagination_default_limit, 10);
        assert_eq!(config.pagination_max_limit, 100);
        assert_eq!(config.login_rate_limit_max, 5);
        assert_eq!(config.login_rate_limit_window_secs, 900);
        assert_eq!(config.reset_rate_limit_max, 3);
        assert_eq!(config.api_rate_limit_max, 200);
        assert_eq!(config.admin_username, "admin");
        assert!(config.smtp_host.is_none());
    }

    #[test]
    fn test_production_environment() {
        let config = ApiConfig::from_pairs(pairs(&[("APP_ENV", "production")]))
            .expect("config should load");
        assert!(config.env.is_production());

        let config =
            ApiConfig::from_pairs(pairs(&[("APP_ENV", "prod")])).expect("alias should load");
        assert!(config.env.is_production());
    }

    #[test]
    fn test_missing_database_url() {
        let vars = vec![(
            "JWT_SECRET".to_string(),
            "test_jwt_secret_minimum_32_characters_long".to_string(),
        )];
        assert!(matches!(
            ApiConfig::from_pairs(vars),
            Err(ConfigError::Env(_))
        ));
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let vars = vec![
            ("DATABASE_URL".to_string(), "postgres://localhost/dsm".to_string()),
            ("JWT_SECRET".to_string(), "too-short".to_string()),
        ];
        assert!(matches!(
            ApiConfig::from_pairs(vars),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_invalid_pagination_rejected() {
        let result = ApiConfig::from_pairs(pairs(&[
            ("PAGINATION_DEFAULT_LIMIT", "50"),
            ("PAGINATION_MAX_LIMIT", "20"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_allowed_origins_parsing() {
        let config = ApiConfig::from_pairs(pairs(&[(
            "CORS_ORIGINS",
            "http://localhost:3000, https://admin.example.com ,",
        )]))
        .expect("config should load");

        assert_eq!(
            config.allowed_origins(),
            vec!["http://localhost:3000", "https://admin.example.com"]
        );
    }

    #[test]
    fn test_bcrypt_cost_bounds() {
        assert!(ApiConfig::from_pairs(pairs(&[("BCRYPT_COST", "3")])).is_err());
        assert!(ApiConfig::from_pairs(pairs(&[("BCRYPT_COST", "10")])).is_ok());
    }
}
