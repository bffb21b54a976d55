//! Shape validation for login and registration input.
//!
//! Hashing lives in the API crate; these checks run before any store call.

use validator::ValidateEmail;

use crate::error::CoreError;

/// Minimum accepted password length for new accounts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Canonical form used for lookups and storage.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Reject anything that is not a syntactically valid email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !email.to_owned().validate_email() {
        return Err(CoreError::Validation("Email inválido".to_string()));
    }
    Ok(())
}

/// Login only requires a non-empty password; strength rules apply at
/// registration time.
pub fn validate_login_password(password: &str) -> Result<(), CoreError> {
    if password.is_empty() {
        return Err(CoreError::Validation("Senha obrigatória".to_string()));
    }
    Ok(())
}

/// Validate that a new password meets the minimum length.
pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "A senha deve ter pelo menos {MIN_PASSWORD_LENGTH} caracteres"
        )));
    }
    Ok(())
}

/// Display name used when registration omits one: the email's local part.
pub fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Admin@Example.COM "), "admin@example.com");
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("operator.one@example.com.br").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert_matches!(validate_email("not-an-email"), Err(CoreError::Validation(_)));
        assert_matches!(validate_email(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn six_characters_is_enough() {
        assert!(validate_password_strength("123456").is_ok());
        assert_matches!(
            validate_password_strength("12345"),
            Err(CoreError::Validation(msg)) if msg.contains("6 caracteres")
        );
    }

    #[test]
    fn login_password_must_not_be_empty() {
        assert!(validate_login_password("x").is_ok());
        assert_matches!(validate_login_password(""), Err(CoreError::Validation(_)));
    }

    #[test]
    fn display_name_is_local_part() {
        assert_eq!(default_display_name("marcos@example.com"), "marcos");
        assert_eq!(default_display_name("no-at-sign"), "no-at-sign");
    }
}
