//! Credential input validation.

use crate::{errors::ApiError, messages};

const USERNAME_MIN_LENGTH: usize = 5;
const USERNAME_MAX_LENGTH: usize = 50;
const PASSWORD_MIN_LENGTH: usize = 8;

/// Validate a signup login/password pair. Returns the field-level message
/// for the first failing rule.
pub fn validate_credentials(login: &str, password: &str) -> Result<(), ApiError> {
    if !username_valid(login) {
        return Err(ApiError::BadRequest(
            messages::USERNAME_REQUIREMENTS.to_string(),
        ));
    }
    if !password_valid(password) {
        return Err(ApiError::BadRequest(
            messages::PASSWORD_REQUIREMENTS.to_string(),
        ));
    }
    Ok(())
}

fn username_valid(login: &str) -> bool {
    let len = login.chars().count();
    (USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&len)
}

/// Password rule: minimum length plus at least one lowercase letter, one
/// uppercase letter, and one digit.
fn password_valid(password: &str) -> bool {
    password.chars().count() >= PASSWORD_MIN_LENGTH
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}
