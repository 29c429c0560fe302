use axum::{
    Router,
    extract::State,
    routing::{get, put},
};
use dsm_db::{
    models::{Admin, AdminProfileChanges},
    repositories::admin,
};

use super::model::ChangePasswordRequest;
use crate::{
    ApiState,
    auth::{AuthAdmin, service},
    error::ApiError,
    extract::ValidatedJson,
    response::ApiResponse,
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/settings/profile", get(get_profile).put(update_profile))
        .route("/settings/password", put(change_password))
}

async fn get_profile(AuthAdmin(admin): AuthAdmin) -> ApiResponse<Admin> {
    ApiResponse::ok(admin)
}

async fn update_profile(
    State(state): State<ApiState>,
    AuthAdmin(current): AuthAdmin,
    ValidatedJson(payload): ValidatedJson<AdminProfileChanges>,
) -> Result<ApiResponse<Admin>, ApiError> {
    let admin = admin::update_profile(&state.pool, current.id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin"))?;
    tracing::info!(admin_id = %admin.id, "Admin profile updated");

    Ok(ApiResponse::ok(admin).with_message("Profile updated successfully"))
}

async fn change_password(
    State(state): State<ApiState>,
    AuthAdmin(current): AuthAdmin,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> Result<ApiResponse<()>, ApiError> {
    let credentials = service::change_password(
        &state.pool,
        current.id,
        &payload.current_password,
        &payload.new_password,
        state.bcrypt_cost,
    )
    .await?;
    tracing::info!(admin_id = %current.id, "Admin password changed");

    service::notify_password_changed(state.email_service.clone(), &credentials).await;

    Ok(ApiResponse::message("Password updated successfully"))
}
