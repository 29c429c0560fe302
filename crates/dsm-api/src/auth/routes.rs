use axum::{
    Router,
    extract::State,
    routing::{get, post},
};
use dsm_db::{models::Admin, repositories::admin};

use super::{
    jwt::{self, TokenKind},
    middleware::AuthAdmin,
    models::{
        AuthResponse, ForgotPasswordRequest, ForgotPasswordResponse, LoginRequest,
        ResetPasswordRequest,
    },
    password::hash_password,
    service,
};
use crate::{
    ApiState,
    email::reset_url,
    error::ApiError,
    extract::ValidatedJson,
    metrics::record_auth_event,
    middleware::rate_limit::RateLimitSettings,
    rate_limit_layer,
    response::ApiResponse,
};

/// Same answer whether or not the email belongs to an admin
const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, a password reset link has been sent";

/// Routes reachable without a token, each class behind its own rate limit
pub fn public_routes(limits: &RateLimitSettings) -> Router<ApiState> {
    let login = Router::new()
        .route("/auth/login", post(login))
        .layer(rate_limit_layer!(limits.login));

    let password_reset = Router::new()
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .layer(rate_limit_layer!(limits.password_reset));

    Router::new().merge(login).merge(password_reset)
}

pub fn protected_routes() -> Router<ApiState> {
    Router::new().route("/auth/me", get(me))
}

async fn login(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, ApiError> {
    let result = service::authenticate(&state.pool, &payload.email, &payload.password).await;
    record_auth_event("login", result.is_ok());
    let credentials = result?;

    let token = jwt::generate_access_token(
        credentials.id,
        &credentials.email,
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )?;
    let admin = admin::find_by_id(&state.pool, credentials.id)
        .await?
        .ok_or_else(|| ApiError::Auth(service::INVALID_CREDENTIALS.to_string()))?;

    tracing::info!(admin_id = %admin.id, "Admin logged in");

    Ok(ApiResponse::ok(AuthResponse { token, admin }).with_message("Login successful"))
}

async fn me(AuthAdmin(admin): AuthAdmin) -> ApiResponse<Admin> {
    ApiResponse::ok(admin)
}

async fn forgot_password(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> Result<ApiResponse<ForgotPasswordResponse>, ApiError> {
    let Some(credentials) = admin::find_credentials_by_email(&state.pool, &payload.email).await?
    else {
        tracing::debug!("Password reset requested for unknown email");
        return Ok(
            ApiResponse::ok(ForgotPasswordResponse::default()).with_message(FORGOT_PASSWORD_MESSAGE)
        );
    };

    let token = jwt::generate_reset_token(
        credentials.id,
        &credentials.email,
        &credentials.password_hash,
        &state.jwt_secret,
        state.reset_token_expiry_minutes,
    )?;
    record_auth_event("password_reset_request", true);

    let response = match state.email_service.clone() {
        Some(email_service) => {
            service::send_reset_link(
                email_service,
                &credentials,
                token,
                state.reset_token_expiry_minutes,
            )
            .await;
            ForgotPasswordResponse::default()
        }
        None => {
            tracing::warn!(
                admin_id = %credentials.id,
                "SMTP not configured, returning the reset token in the response"
            );
            ForgotPasswordResponse {
                reset_url: Some(reset_url(&state.frontend_url, &token)),
                reset_token: Some(token),
            }
        }
    };

    Ok(ApiResponse::ok(response).with_message(FORGOT_PASSWORD_MESSAGE))
}

fn invalid_reset_token() -> ApiError {
    ApiError::Validation("Invalid or expired reset token".to_string())
}

async fn reset_password(
    State(state): State<ApiState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> Result<ApiResponse<AuthResponse>, ApiError> {
    let claims = jwt::verify_token(&payload.token, &state.jwt_secret, TokenKind::PasswordReset)
        .map_err(|_| invalid_reset_token())?;
    let admin_id = claims.admin_id().map_err(|_| invalid_reset_token())?;

    let credentials = admin::find_credentials_by_id(&state.pool, admin_id)
        .await?
        .ok_or_else(invalid_reset_token)?;

    // A token issued before the last password change no longer matches
    let current = jwt::password_fingerprint(&credentials.password_hash);
    if claims.fingerprint.as_deref() != Some(current.as_str()) {
        record_auth_event("password_reset", false);
        return Err(invalid_reset_token());
    }

    let password_hash = hash_password(payload.password, state.bcrypt_cost).await?;
    if !admin::update_password(&state.pool, admin_id, &password_hash).await? {
        return Err(invalid_reset_token());
    }
    record_auth_event("password_reset", true);
    tracing::info!(%admin_id, "Password reset completed");

    service::notify_password_changed(state.email_service.clone(), &credentials).await;

    let token = jwt::generate_access_token(
        admin_id,
        &credentials.email,
        &state.jwt_secret,
        state.jwt_expiry_hours,
    )?;
    let admin = admin::find_by_id(&state.pool, admin_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin"))?;

    Ok(ApiResponse::ok(AuthResponse { token, admin }).with_message("Password reset successful"))
}
