use lettre::{
    Message, SmtpTransport, Transport, message::Mailbox,
    transport::smtp::authentication::Credentials,
};

use crate::{error::ApiError, metrics::record_email_event};

#[derive(Clone)]
pub struct EmailService {
    smtp_host: String,
    smtp_port: Option<u16>,
    smtp_username: String,
    smtp_password: String,
    from: Mailbox,
    frontend_url: String,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("from", &self.from.to_string())
            .finish_non_exhaustive()
    }
}

/// Subject and plain-text body of an outgoing email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailContent {
    pub subject: String,
    pub body: String,
}

/// Link the admin follows to choose a new password
pub fn reset_url(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password/{}",
        frontend_url.trim_end_matches('/'),
        token
    )
}

pub fn password_reset_content(username: &str, url: &str, expiry_minutes: i64) -> EmailContent {
    EmailContent {
        subject: "Reset your password".to_string(),
        body: format!(
            "Hi {username},\n\nA password reset was requested for your driving school admin account.\n\nChoose a new password using this link:\n{url}\n\nThis link expires in {expiry_minutes} minutes.\n\nIf you did not request this, you can ignore this email."
        ),
    }
}

pub fn password_changed_content(username: &str) -> EmailContent {
    EmailContent {
        subject: "Your password was changed".to_string(),
        body: format!(
            "Hi {username},\n\nThe password of your driving school admin account was just changed.\n\nIf you did not make this change, reset your password immediately and review recent account activity."
        ),
    }
}

impl EmailService {
    pub fn new(
        smtp_host: &str,
        smtp_port: Option<u16>,
        smtp_username: &str,
        smtp_password: &str,
        from_email: &str,
        from_name: &str,
        frontend_url: &str,
    ) -> Result<Self, ApiError> {
        let from: Mailbox = format!("{from_name} <{from_email}>")
            .parse()
            .map_err(|e| ApiError::Email(format!("Invalid from email: {e}")))?;

        Ok(Self {
            smtp_host: smtp_host.to_string(),
            smtp_port,
            smtp_username: smtp_username.to_string(),
            smtp_password: smtp_password.to_string(),
            from,
            frontend_url: frontend_url.to_string(),
        })
    }

    fn create_transport(&self) -> Result<SmtpTransport, ApiError> {
        let credentials = Credentials::new(self.smtp_username.clone(), self.smtp_password.clone());

        let mut builder = SmtpTransport::relay(&self.smtp_host)
            .map_err(|e| ApiError::Email(format!("Failed to create SMTP transport: {e}")))?
            .credentials(credentials);
        if let Some(port) = self.smtp_port {
            builder = builder.port(port);
        }

        Ok(builder.build())
    }

    /// Blocking send; call from `spawn_blocking`.
    fn send(&self, to_email: &str, content: EmailContent) -> Result<(), ApiError> {
        let to: Mailbox = to_email
            .parse()
            .map_err(|e| ApiError::Email(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(content.subject)
            .body(content.body)
            .map_err(|e| ApiError::Email(format!("Failed to build email: {e}")))?;

        self.create_transport()?
            .send(&email)
            .map_err(|e| ApiError::Email(format!("Failed to send email: {e}")))?;

        Ok(())
    }

    pub fn send_password_reset_email(
        &self,
        to_email: &str,
        username: &str,
        reset_token: &str,
        expiry_minutes: i64,
    ) -> Result<(), ApiError> {
        let url = reset_url(&self.frontend_url, reset_token);
        let result = self.send(
            to_email,
            password_reset_content(username, &url, expiry_minutes),
        );
        record_email_event("password_reset", result.is_ok());
        result
    }

    pub fn send_password_changed_email(
        &self,
        to_email: &str,
        username: &str,
    ) -> Result<(), ApiError> {
        let result = self.send(to_email, password_changed_content(username));
        record_email_event("password_changed", result.is_ok());
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_url() {
        assert_eq!(
            reset_url("http://localhost:3000/", "abc.def"),
            "http://localhost:3000/reset-password/abc.def"
        );
        assert_eq!(
            reset_url("https://admin.example.com", "t"),
            "https://admin.example.com/reset-password/t"
        );
    }

    #[test]
    fn test_password_reset_content() {
        let content = password_reset_content("admin", "http://x/reset-password/t", 60);
        assert!(content.body.contains("Hi admin"));
        assert!(content.body.contains("http://x/reset-password/t"));
        assert!(content.body.contains("60 minutes"));
    }

    #[test]
    fn test_invalid_from_address_rejected() {
        let result = EmailService::new(
            "smtp.example.com",
            None,
            "user",
            "pass",
            "not-an-email",
            "School",
            "http://localhost:3000",
        );
        assert!(result.is_err());
    }
}
