use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::ApiError;

/// What a token may be used for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    PasswordReset,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // admin id
    pub email: String,
    pub kind: TokenKind,
    /// Fingerprint of the password hash a reset token was issued against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    pub exp: usize,
    pub iat: usize,
}

impl Claims {
    pub fn admin_id(&self) -> Result<Uuid, ApiError> {
        Uuid::parse_str(&self.sub).map_err(|_| ApiError::unauthorized())
    }
}

fn timestamp(at: chrono::DateTime<Utc>) -> usize {
    usize::try_from(at.timestamp()).unwrap_or_default()
}

/// Sign arbitrary claims with the shared HMAC secret
pub fn encode_token(claims: &Claims, jwt_secret: &str) -> Result<String, ApiError> {
    let token = jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// Generate a bearer token for an admin
pub fn generate_access_token(
    admin_id: Uuid,
    email: &str,
    jwt_secret: &str,
    expiry_hours: i64,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: admin_id.to_string(),
        email: email.to_string(),
        kind: TokenKind::Access,
        fingerprint: None,
        iat: timestamp(now),
        exp: timestamp(now + Duration::hours(expiry_hours)),
    };

    encode_token(&claims, jwt_secret)
}

/// Generate a password reset token bound to the current password hash
pub fn generate_reset_token(
    admin_id: Uuid,
    email: &str,
    password_hash: &str,
    jwt_secret: &str,
    expiry_minutes: i64,
) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: admin_id.to_string(),
        email: email.to_string(),
        kind: TokenKind::PasswordReset,
        fingerprint: Some(password_fingerprint(password_hash)),
        iat: timestamp(now),
        exp: timestamp(now + Duration::minutes(expiry_minutes)),
    };

    encode_token(&claims, jwt_secret)
}

/// Short digest of a password hash. Changes whenever the password does.
pub fn password_fingerprint(password_hash: &str) -> String {
    let digest = Sha256::digest(password_hash.as_bytes());
    hex::encode(&digest[..16])
}

/// Verify signature and expiry, and check the token is of the expected kind
pub fn verify_token(token: &str, jwt_secret: &str, expected: TokenKind) -> Result<Claims, ApiError> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        ApiError::unauthorized()
    })?;

    if token_data.claims.kind != expected {
        tracing::debug!(kind = ?token_data.claims.kind, "Token of the wrong kind");
        return Err(ApiError::unauthorized());
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_jwt_secret_minimum_32_characters_long";

    #[test]
    fn test_generate_and_verify_access_token() {
        let admin_id = Uuid::new_v4();

        let token = generate_access_token(admin_id, "admin@test.com", SECRET, 24)
            .expect("Failed to generate token");
        assert!(!token.is_empty());

        let claims = verify_token(&token, SECRET, TokenKind::Access).expect("Failed to verify");
        assert_eq!(claims.admin_id().unwrap(), admin_id);
        assert_eq!(claims.email, "admin@test.com");
        assert!(claims.fingerprint.is_none());

        let lifetime = claims.exp - claims.iat;
        assert!(
            (86390..=86410).contains(&lifetime),
            "Token should expire in approximately 24 hours, got {lifetime} seconds"
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = generate_access_token(Uuid::new_v4(), "a@b.com", SECRET, 1).unwrap();
        let result = verify_token(&token, "wrong_jwt_secret_minimum_32_characters_long", TokenKind::Access);

        match result {
            Err(ApiError::Auth(msg)) => assert_eq!(msg, "Not authorized to access this route"),
            _ => panic!("Expected Auth error"),
        }
    }

    #[test]
    fn test_malformed_token_rejected() {
        assert!(verify_token("invalid.jwt.token", SECRET, TokenKind::Access).is_err());
        assert!(verify_token("", SECRET, TokenKind::Access).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "a@b.com".to_string(),
            kind: TokenKind::Access,
            fingerprint: None,
            iat: timestamp(now - Duration::hours(3)),
            exp: timestamp(now - Duration::hours(1)),
        };
        let token = encode_token(&claims, SECRET).unwrap();

        assert!(verify_token(&token, SECRET, TokenKind::Access).is_err());
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let admin_id = Uuid::new_v4();
        let reset = generate_reset_token(admin_id, "a@b.com", "$2b$12$hash", SECRET, 60).unwrap();
        let access = generate_access_token(admin_id, "a@b.com", SECRET, 1).unwrap();

        assert!(verify_token(&reset, SECRET, TokenKind::Access).is_err());
        assert!(verify_token(&access, SECRET, TokenKind::PasswordReset).is_err());

        let claims = verify_token(&reset, SECRET, TokenKind::PasswordReset).unwrap();
        assert_eq!(
            claims.fingerprint.as_deref(),
            Some(password_fingerprint("$2b$12$hash").as_str())
        );
    }

    #[test]
    fn test_password_fingerprint() {
        let a = password_fingerprint("$2b$12$first");
        assert_eq!(a.len(), 32);
        assert_eq!(a, password_fingerprint("$2b$12$first"));
        assert_ne!(a, password_fingerprint("$2b$12$second"));
    }

    #[test]
    fn test_claims_serialization() {
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            kind: TokenKind::PasswordReset,
            fingerprint: None,
            iat: 1,
            exp: 2,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["kind"], "password_reset");
        assert!(json.get("fingerprint").is_none());

        let back: Claims = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, TokenKind::PasswordReset);
    }
}
