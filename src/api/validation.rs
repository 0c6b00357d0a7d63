use base64::{Engine as _, engine::general_purpose::STANDARD};

use super::ApiError;
use crate::constants::{auth, limits};

pub fn validate_id(id: i32) -> Result<i32, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

/// Unwraps a required text field, rejecting missing or blank values.
pub fn require<'a>(value: Option<&'a String>, field: &str) -> Result<&'a str, ApiError> {
    match value.map(|v| v.trim()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::validation(format!("{field} is required"))),
    }
}

pub fn validate_name(name: &str, field: &str) -> Result<String, ApiError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ApiError::validation(format!("{field} cannot be empty")));
    }

    if trimmed.chars().count() > limits::MAX_NAME_LEN {
        return Err(ApiError::validation(format!(
            "{field} must be {} characters or less",
            limits::MAX_NAME_LEN
        )));
    }

    Ok(trimmed.to_string())
}

/// Loose address check: one `@`, a non-empty local part and a dotted domain.
pub fn validate_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim();
    let invalid = || ApiError::validation("Invalid email format");

    if email.len() > limits::MAX_EMAIL_LEN || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }

    Ok(email.to_string())
}

pub fn validate_password(password: &str) -> Result<&str, ApiError> {
    if password.chars().count() < auth::MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            auth::MIN_PASSWORD_LEN
        )));
    }
    Ok(password)
}

/// Fingerprints travel as standard base64.
pub fn decode_fingerprint(value: Option<&str>) -> Result<Option<Vec<u8>>, ApiError> {
    value
        .map(|encoded| {
            STANDARD
                .decode(encoded.trim())
                .map_err(|_| ApiError::validation("biometric_fingerprint must be base64"))
        })
        .transpose()
}
