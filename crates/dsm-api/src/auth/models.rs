use dsm_db::models::Admin;
use serde::{Deserialize, Serialize};

use crate::{
    error::ApiError,
    extract::ValidatePayload,
    validation::{normalize_email, trim, validate_email, validate_password},
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl ValidatePayload for LoginRequest {
    fn normalize(&mut self) {
        normalize_email(&mut self.email);
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.email.is_empty() || self.password.is_empty() {
            return Err(ApiError::Validation(
                "Please provide an email and password".to_string(),
            ));
        }
        validate_email(&self.email)
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl ValidatePayload for ForgotPasswordRequest {
    fn normalize(&mut self) {
        normalize_email(&mut self.email);
    }

    fn validate(&self) -> Result<(), ApiError> {
        validate_email(&self.email)
    }
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

impl ValidatePayload for ResetPasswordRequest {
    fn normalize(&mut self) {
        trim(&mut self.token);
    }

    fn validate(&self) -> Result<(), ApiError> {
        if self.token.is_empty() {
            return Err(ApiError::Validation("token is required".to_string()));
        }
        validate_password(&self.password)
    }
}

/// Token issued on login and after a password reset
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub admin: Admin,
}

/// Only populated when no SMTP server is configured
#[derive(Debug, Default, Serialize)]
pub struct ForgotPasswordResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reset_url: Option<String>,
}
