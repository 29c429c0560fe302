//! Field validators shared by the request payloads.
//!
//! Every validator returns `ApiError::Validation` with a message naming the
//! offending field, which ends up as the `error` of a 400 response.

use std::sync::LazyLock;

use chrono::{NaiveDate, Utc};
use regex::Regex;
use validator::ValidateEmail;

use crate::error::ApiError;

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").expect("valid time regex"));

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{8,15}$").expect("valid phone regex"));

static PLATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9][A-Z0-9-]{1,19}$").expect("valid plate regex"));

static NATIONAL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{5,30}$").expect("valid national id regex"));

/// Trim a string field in place
pub fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trim an optional string field, turning blank values into `None`
pub fn trim_optional(value: &mut Option<String>) {
    if let Some(inner) = value {
        trim(inner);
        if inner.is_empty() {
            *value = None;
        }
    }
}

pub fn normalize_email(email: &mut String) {
    *email = email.trim().to_lowercase();
}

/// Drop the separators people type into phone numbers
pub fn normalize_phone(phone: &mut String) {
    *phone = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect();
}

/// Plates are stored upper-cased without spaces
pub fn normalize_plate(plate: &mut String) {
    *plate = plate
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase();
}

/// Required text: non-empty, bounded length, no markup characters
pub fn validate_text(field: &str, value: &str, max_len: usize) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{field} is required")));
    }

    if value.chars().count() > max_len {
        return Err(ApiError::Validation(format!(
            "{field} must be at most {max_len} characters long"
        )));
    }

    if value.contains(['<', '>']) {
        return Err(ApiError::Validation(format!(
            "{field} contains invalid characters"
        )));
    }

    Ok(())
}

pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max_len: usize,
) -> Result<(), ApiError> {
    value.map_or(Ok(()), |v| validate_text(field, v, max_len))
}

/// Validate email format using the validator crate
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::Validation("email is required".to_string()));
    }

    if email.len() > 255 || !email.validate_email() {
        return Err(ApiError::Validation("Invalid email format".to_string()));
    }

    Ok(())
}

/// Validate an already normalized phone number
pub fn validate_phone(phone: &str) -> Result<(), ApiError> {
    if !PHONE_RE.is_match(phone) {
        return Err(ApiError::Validation(
            "Invalid phone number: expected 8 to 15 digits with an optional leading +".to_string(),
        ));
    }
    Ok(())
}

/// Validate a 24-hour `HH:MM` time
pub fn validate_time(field: &str, value: &str) -> Result<(), ApiError> {
    if !TIME_RE.is_match(value) {
        return Err(ApiError::Validation(format!(
            "{field} must be in HH:MM format"
        )));
    }
    Ok(())
}

pub fn validate_plate(plate: &str) -> Result<(), ApiError> {
    if !PLATE_RE.is_match(plate) {
        return Err(ApiError::Validation(
            "Invalid plate number: use 2 to 20 letters, digits or dashes".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_national_id(value: &str) -> Result<(), ApiError> {
    if !NATIONAL_ID_RE.is_match(value) {
        return Err(ApiError::Validation(
            "national_id must be 5 to 30 letters or digits".to_string(),
        ));
    }
    Ok(())
}

/// Non-negative, finite monetary amount
pub fn validate_amount(field: &str, value: f64) -> Result<(), ApiError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ApiError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Integer within an inclusive range
pub fn validate_range(field: &str, value: i64, min: i64, max: i64) -> Result<(), ApiError> {
    if value < min || value > max {
        return Err(ApiError::Validation(format!(
            "{field} must be between {min} and {max}"
        )));
    }
    Ok(())
}

/// Strictly positive, finite number
pub fn validate_positive(field: &str, value: f64) -> Result<(), ApiError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ApiError::Validation(format!(
            "{field} must be greater than 0"
        )));
    }
    Ok(())
}

/// `start` must be a valid time strictly before `end`
pub fn validate_time_window(start: &str, end: &str) -> Result<(), ApiError> {
    validate_time("start_time", start)?;
    validate_time("end_time", end)?;
    // Zero-padded HH:MM compares correctly as text
    if start >= end {
        return Err(ApiError::Validation(
            "start_time must be before end_time".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_past_date(field: &str, value: NaiveDate) -> Result<(), ApiError> {
    if value >= Utc::now().date_naive() {
        return Err(ApiError::Validation(format!("{field} must be in the past")));
    }
    Ok(())
}

/// Partial updates must carry at least one field
pub fn require_changes(has_changes: bool) -> Result<(), ApiError> {
    if !has_changes {
        return Err(ApiError::Validation(
            "No fields provided for update".to_string(),
        ));
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), ApiError> {
    let length = password.chars().count();
    if length < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters long".to_string(),
        ));
    }

    if length > 128 {
        return Err(ApiError::Validation(
            "Password must be at most 128 characters long".to_string(),
        ));
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_number = password.chars().any(char::is_numeric);

    if !has_letter || !has_number {
        return Err(ApiError::Validation(
            "Password must contain at least one letter and one number".to_string(),
        ));
    }

    Ok(())
}

/// Validate admin username
pub fn validate_username(username: &str) -> Result<(), ApiError> {
    let length = username.chars().count();
    if !(3..=50).contains(&length) {
        return Err(ApiError::Validation(
            "Username must be between 3 and 50 characters long".to_string(),
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(ApiError::Validation(
            "Username can only contain letters, numbers, dots, underscores, and hyphens"
                .to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_time() {
        assert!(validate_time("time", "00:00").is_ok());
        assert!(validate_time("time", "09:30").is_ok());
        assert!(validate_time("time", "23:59").is_ok());

        assert!(validate_time("time", "24:00").is_err());
        assert!(validate_time("time", "9:30").is_err());
        assert!(validate_time("time", "12:60").is_err());
        assert!(validate_time("time", "12:30:00").is_err());
        assert!(validate_time("time", "noon").is_err());
        assert!(validate_time("time", "").is_err());
    }

    #[test]
    fn test_phone_normalization_and_validation() {
        let mut phone = "+212 (6) 12-34.56-78".to_string();
        normalize_phone(&mut phone);
        assert_eq!(phone, "+212612345678");
        assert!(validate_phone(&phone).is_ok());

        assert!(validate_phone("0612345678").is_ok());
        assert!(validate_phone("1234567").is_err());
        assert!(validate_phone("12345678901234567").is_err());
        assert!(validate_phone("06abc45678").is_err());
        assert!(validate_phone("++212612345678").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user+tag@example.co.uk").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
    }

    #[test]
    fn test_normalize_email() {
        let mut email = "  Admin@Example.COM ".to_string();
        normalize_email(&mut email);
        assert_eq!(email, "admin@example.com");
    }

    #[test]
    fn test_plate() {
        let mut plate = "ab 123 cd".to_string();
        normalize_plate(&mut plate);
        assert_eq!(plate, "AB123CD");
        assert!(validate_plate(&plate).is_ok());
        assert!(validate_plate("12345-A-6").is_ok());
        assert!(validate_plate("A").is_err());
        assert!(validate_plate("-AB12").is_err());
        assert!(validate_plate("AB_12").is_err());
    }

    #[test]
    fn test_validate_text() {
        assert!(validate_text("name", "Jane Doe", 120).is_ok());
        assert!(validate_text("name", "", 120).is_err());
        assert!(validate_text("name", "<script>alert(1)</script>", 120).is_err());
        assert!(validate_text("name", &"a".repeat(121), 120).is_err());
        assert!(validate_optional_text("notes", None, 10).is_ok());
        assert!(validate_optional_text("notes", Some("x>y"), 10).is_err());
    }

    #[test]
    fn test_trim_optional() {
        let mut value = Some("   ".to_string());
        trim_optional(&mut value);
        assert!(value.is_none());

        let mut value = Some("  kept ".to_string());
        trim_optional(&mut value);
        assert_eq!(value.as_deref(), Some("kept"));
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("amount", 0.0).is_ok());
        assert!(validate_amount("amount", 1500.5).is_ok());
        assert!(validate_amount("amount", -1.0).is_err());
        assert!(validate_amount("amount", f64::NAN).is_err());
        assert!(validate_amount("amount", f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_time_window() {
        assert!(validate_time_window("08:00", "12:30").is_ok());
        assert!(validate_time_window("12:30", "08:00").is_err());
        assert!(validate_time_window("08:00", "08:00").is_err());
        assert!(validate_time_window("8:00", "12:00").is_err());
    }

    #[test]
    fn test_validate_positive_and_past_date() {
        assert!(validate_positive("duration_hours", 1.5).is_ok());
        assert!(validate_positive("duration_hours", 0.0).is_err());

        let yesterday = Utc::now().date_naive() - chrono::Duration::days(1);
        let tomorrow = Utc::now().date_naive() + chrono::Duration::days(1);
        assert!(validate_past_date("date_of_birth", yesterday).is_ok());
        assert!(validate_past_date("date_of_birth", tomorrow).is_err());
    }

    #[test]
    fn test_require_changes() {
        assert!(require_changes(true).is_ok());
        assert_eq!(
            require_changes(false).unwrap_err().public_message(),
            "No fields provided for update"
        );
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short1").is_err());
        assert!(validate_password("noNumbersHere").is_err());
        assert!(validate_password("12345678").is_err());
        assert!(validate_password(&format!("a1{}", "x".repeat(127))).is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("admin").is_ok());
        assert!(validate_username("office.manager").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("user name").is_err());
        assert!(validate_username("<script>").is_err());
    }

    #[test]
    fn test_validate_national_id() {
        assert!(validate_national_id("AB123456").is_ok());
        assert!(validate_national_id("1234").is_err());
        assert!(validate_national_id("AB-12345").is_err());
    }
}
