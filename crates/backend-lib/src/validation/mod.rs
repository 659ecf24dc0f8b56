// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request validation module.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use visionassist_common::{NewAnalysis, RegisterRequest, UserUpdate};

use crate::auth::{validate_password_strength, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

// Column limits of the account and history records
const MAX_NAME_LENGTH: usize = 100;
const MAX_EMAIL_LENGTH: usize = 255;
const MAX_FILENAME_LENGTH: usize = 255;
const MAX_CAPTION_LENGTH: usize = 10_000;
const MIN_SPEECH_RATE: f64 = 0.25;
const MAX_SPEECH_RATE: f64 = 4.0;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid speech rate: {0}")]
    InvalidSpeechRate(String),

    #[error("Invalid analysis record: {0}")]
    InvalidAnalysis(String),

    #[error("Empty update")]
    EmptyUpdate,
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Lowercase and trim an address so lookups are case-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Validate a display name, returning it trimmed
pub fn validate_name(name: &str) -> ValidationResult<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidName(
            "Name must not be empty".to_string(),
        ));
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }

    if name.chars().any(char::is_control) {
        return Err(ValidationError::InvalidName(
            "Name contains invalid characters".to_string(),
        ));
    }

    Ok(name)
}

/// Validate an email address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    let email = email.trim();
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email must be at most {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Email address is not valid".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a new password
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if !validate_password_strength(password) {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be between {MIN_PASSWORD_LENGTH} and {MAX_PASSWORD_LENGTH} characters long"
        )));
    }

    Ok(password)
}

/// Validate a speech rate multiplier
pub fn validate_speech_rate(rate: f64) -> ValidationResult<f64> {
    if !rate.is_finite() || !(MIN_SPEECH_RATE..=MAX_SPEECH_RATE).contains(&rate) {
        return Err(ValidationError::InvalidSpeechRate(format!(
            "Speech rate must be between {MIN_SPEECH_RATE} and {MAX_SPEECH_RATE}"
        )));
    }

    Ok(rate)
}

/// Validate a registration request
pub fn validate_register(req: &RegisterRequest) -> ValidationResult<()> {
    validate_name(&req.name)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    Ok(())
}

/// Validate a profile update; at least one field must be present
pub fn validate_user_update(update: &UserUpdate) -> ValidationResult<()> {
    if update.is_empty() {
        return Err(ValidationError::EmptyUpdate);
    }

    if let Some(name) = &update.name {
        validate_name(name)?;
    }

    if let Some(rate) = update.speech_rate {
        validate_speech_rate(rate)?;
    }

    Ok(())
}

/// Validate an analysis record before it is stored
pub fn validate_analysis(entry: &NewAnalysis) -> ValidationResult<()> {
    if let Some(filename) = &entry.image_filename {
        if filename.chars().count() > MAX_FILENAME_LENGTH {
            return Err(ValidationError::InvalidAnalysis(format!(
                "Image filename must be at most {MAX_FILENAME_LENGTH} characters"
            )));
        }
    }

    if let Some(caption) = &entry.caption {
        if caption.chars().count() > MAX_CAPTION_LENGTH {
            return Err(ValidationError::InvalidAnalysis(format!(
                "Caption must be at most {MAX_CAPTION_LENGTH} characters"
            )));
        }
    }

    Ok(())
}
