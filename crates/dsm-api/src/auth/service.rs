use dsm_db::{
    models::{Admin, AdminCredentials},
    repositories::admin,
};
use rand::{Rng, distributions::Alphanumeric};
use sqlx::PgPool;
use uuid::Uuid;

use super::password::{hash_password, verify_password};
use crate::{ApiConfig, email::EmailService, error::ApiError, validation::normalize_email};

pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Check an email/password pair against the stored hash
pub async fn authenticate(
    pool: &PgPool,
    email: &str,
    password: &str,
) -> Result<AdminCredentials, ApiError> {
    let Some(credentials) = admin::find_credentials_by_email(pool, email).await? else {
        tracing::debug!("Login attempt for unknown email");
        return Err(ApiError::Auth(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password(password.to_string(), credentials.password_hash.clone()).await? {
        tracing::warn!(admin_id = %credentials.id, "Login attempt with wrong password");
        return Err(ApiError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    Ok(credentials)
}

/// Replace the password after checking the current one
pub async fn change_password(
    pool: &PgPool,
    admin_id: Uuid,
    current_password: &str,
    new_password: &str,
    bcrypt_cost: u32,
) -> Result<AdminCredentials, ApiError> {
    let credentials = admin::find_credentials_by_id(pool, admin_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Admin"))?;

    if !verify_password(current_password.to_string(), credentials.password_hash.clone()).await? {
        return Err(ApiError::Auth("Current password is incorrect".to_string()));
    }

    let password_hash = hash_password(new_password.to_string(), bcrypt_cost).await?;
    if !admin::update_password(pool, admin_id, &password_hash).await? {
        return Err(ApiError::not_found("Admin"));
    }

    Ok(AdminCredentials {
        password_hash,
        ..credentials
    })
}

/// Email a reset link. Failures are logged, never returned, so the caller's
/// answer cannot reveal which addresses belong to an admin.
pub async fn send_reset_link(
    email_service: EmailService,
    credentials: &AdminCredentials,
    token: String,
    expiry_minutes: i64,
) {
    let admin_id = credentials.id;
    let to = credentials.email.clone();
    let username = credentials.username.clone();
    let sent = tokio::task::spawn_blocking(move || {
        email_service.send_password_reset_email(&to, &username, &token, expiry_minutes)
    })
    .await;

    match sent {
        Ok(Ok(())) => tracing::debug!(%admin_id, "Password reset email sent"),
        Ok(Err(e)) => tracing::error!(%admin_id, "Failed to send password reset email: {e}"),
        Err(e) => tracing::error!(%admin_id, "Password reset email task failed: {e}"),
    }
}

/// Tell the admin their password changed. Failures are logged, never returned.
pub async fn notify_password_changed(
    email_service: Option<EmailService>,
    credentials: &AdminCredentials,
) {
    let Some(email_service) = email_service else {
        return;
    };

    let admin_id = credentials.id;
    let to = credentials.email.clone();
    let username = credentials.username.clone();
    let sent = tokio::task::spawn_blocking(move || {
        email_service.send_password_changed_email(&to, &username)
    })
    .await;

    match sent {
        Ok(Ok(())) => tracing::debug!(%admin_id, "Password changed email sent"),
        Ok(Err(e)) => tracing::warn!(%admin_id, "Failed to send password changed email: {e}"),
        Err(e) => tracing::warn!(%admin_id, "Password changed email task failed: {e}"),
    }
}

/// Random alphanumeric password containing at least one letter and one digit
pub fn generate_password(length: usize) -> String {
    loop {
        let candidate: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(length)
            .map(char::from)
            .collect();

        let has_letter = candidate.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = candidate.chars().any(|c| c.is_ascii_digit());
        if has_letter && has_digit {
            return candidate;
        }
    }
}

/// Create the first admin from `ADMIN_EMAIL` when the table is empty.
///
/// Returns the created admin, or `None` when nothing had to be done.
pub async fn ensure_initial_admin(
    pool: &PgPool,
    config: &ApiConfig,
) -> anyhow::Result<Option<Admin>> {
    if admin::count(pool).await? > 0 {
        return Ok(None);
    }

    let Some(email) = config.admin_email.as_ref() else {
        tracing::warn!("No admin account exists and ADMIN_EMAIL is not set");
        return Ok(None);
    };
    let mut email = email.clone();
    normalize_email(&mut email);

    let password = match config.admin_password.as_ref() {
        Some(password) => password.clone(),
        None => {
            let generated = generate_password(20);
            tracing::warn!(
                email = %email,
                password = %generated,
                "Generated a password for the initial admin, change it after the first login"
            );
            generated
        }
    };

    let password_hash = hash_password(password, config.bcrypt_cost).await?;
    let created = admin::create(pool, &config.admin_username, &email, &password_hash).await?;

    tracing::info!(admin_id = %created.id, username = %created.username, "Created initial admin");
    Ok(Some(created))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_password() {
        let password = generate_password(20);
        assert_eq!(password.len(), 20);
        assert!(password.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(crate::validation::validate_password(&password).is_ok());
        assert_ne!(password, generate_password(20));
    }
}
