use dsm_db::models::AdminProfileChanges;
use serde::Deserialize;

use crate::{
    error::ApiError,
    extract::ValidatePayload,
    validation::{normalize_email, require_changes, trim, validate_email, validate_password, validate_username},
};

impl ValidatePayload for AdminProfileChanges {
    fn normalize(&mut self) {
        if let Some(username) = &mut self.username {
            trim(username);
        }
        if let Some(email) = &mut self.email {
            normalize_email(email);
        }
    }

    fn validate(&self) -> Result<(), ApiError> {
        require_changes(self.username.is_some() || self.email.is_some())?;

        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

impl ValidatePayload for ChangePasswordRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.current_password.is_empty() {
            return Err(ApiError::Validation(
                "Current password is required".to_string(),
            ));
        }
        validate_password(&self.new_password)?;
        if self.new_password == self.current_password {
            return Err(ApiError::Validation(
                "New password must be different from the current password".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_changes_normalized() {
        let mut changes = AdminProfileChanges {
            username: Some("  office ".to_string()),
            email: Some(" Office@School.COM ".to_string()),
        };
        changes.normalize();
        assert_eq!(changes.username.as_deref(), Some("office"));
        assert_eq!(changes.email.as_deref(), Some("office@school.com"));
        assert!(changes.validate().is_ok());
    }

    #[test]
    fn test_empty_profile_update_rejected() {
        assert_eq!(
            AdminProfileChanges::default()
                .validate()
                .unwrap_err()
                .public_message(),
            "No fields provided for update"
        );
    }

    #[test]
    fn test_change_password_rules() {
        let request = ChangePasswordRequest {
            current_password: "password123".to_string(),
            new_password: "password123".to_string(),
        };
        assert!(request.validate().is_err());

        let request = ChangePasswordRequest {
            current_password: "password123".to_string(),
            new_password: "short1".to_string(),
        };
        assert!(request.validate().is_err());

        let request = ChangePasswordRequest {
            current_password: "password123".to_string(),
            new_password: "n3w-passphrase".to_string(),
        };
        assert!(request.validate().is_ok());
    }
}
