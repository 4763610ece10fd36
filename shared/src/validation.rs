//! Validation utilities for the Crop Advisory Platform

use chrono::NaiveDate;
use std::borrow::Cow;
use validator::ValidationError;

// ============================================================================
// Onboarding Validations
// ============================================================================

/// Validate a sowing date is a real `YYYY-MM-DD` calendar date
pub fn validate_sowing_date(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::from("Sowing date is required"));
        return Err(err);
    }
    if NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
        let mut err = ValidationError::new("date");
        err.message = Some(Cow::from("Sowing date must be a valid date (YYYY-MM-DD)"));
        return Err(err);
    }
    Ok(())
}

// ============================================================================
// Account Validations
// ============================================================================

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') {
        Ok(())
    } else {
        Err("Please provide a valid email address")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters long");
    }
    Ok(())
}

/// Normalise an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
