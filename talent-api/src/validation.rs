//! Validation Traits and Candidate Field Rules
//!
//! Field rules applied to a candidate submission before it reaches the
//! upsert coordinator:
//!
//! | field              | rule                               |
//! |--------------------|------------------------------------|
//! | `firstName`        | required, non-blank                |
//! | `lastName`         | required, non-blank                |
//! | `phoneNumber`      | optional, phone format             |
//! | `email`            | required, email format             |
//! | `callTimeInterval` | optional, free text                |
//! | `linkedInUrl`      | optional, absolute http/https/ftp  |
//! | `gitHubUrl`        | optional, absolute http/https/ftp  |
//! | `comment`          | required, non-blank                |
//!
//! The checks are deliberately loose. An email needs exactly one `@` with
//! something on both sides; a phone number needs at least one digit and
//! only the usual separators.

use once_cell::sync::Lazy;
use regex::Regex;
use talent_core::{CandidatePayload, ValidationError};

use crate::error::{ApiError, ApiResult};

/// Trait for validating non-empty strings.
///
/// # Example
/// ```ignore
/// use talent_api::validation::ValidateNonEmpty;
///
/// fn check(name: &str) -> ApiResult<()> {
///     name.validate_non_empty("firstName")?;
///     Ok(())
/// }
/// ```
pub trait ValidateNonEmpty {
    /// Validate that the value is non-empty.
    ///
    /// # Errors
    /// Returns a `MissingField` error if the value is absent, empty or
    /// whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for &str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        (*self).validate_non_empty(field_name)
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(missing_field(field_name)),
        }
    }
}

// ============================================================================
// FORMAT RULES
// ============================================================================

static EMAIL_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[^@\r\n]+@[^@\r\n]+$"));

static PHONE_PATTERN: Lazy<Result<Regex, regex::Error>> = Lazy::new(|| {
    Regex::new(r"^\+?[0-9\s\-.()]*[0-9][0-9\s\-.()]*(\s?(x|ext\.?)\s?[0-9]+)?$")
});

static ABSOLUTE_URL_PATTERN: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^(?i:https?|ftp)://\S+$"));

fn matches(pattern: &Lazy<Result<Regex, regex::Error>>, value: &str) -> ApiResult<bool> {
    match pattern.as_ref() {
        Ok(re) => Ok(re.is_match(value)),
        Err(e) => Err(ApiError::internal_error(format!(
            "Invalid validation pattern: {}",
            e
        ))),
    }
}

fn missing_field(field: &str) -> ApiError {
    ValidationError::RequiredFieldMissing {
        field: field.to_string(),
    }
    .into()
}

fn invalid_format(field: &str, expected: &str) -> ApiError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        expected: expected.to_string(),
    }
    .into()
}

/// Validate an email address.
pub fn validate_email(field_name: &str, value: &str) -> ApiResult<()> {
    value.validate_non_empty(field_name)?;
    if !matches(&EMAIL_PATTERN, value)? {
        return Err(invalid_format(field_name, "email address"));
    }
    Ok(())
}

/// Validate a phone number.
pub fn validate_phone(field_name: &str, value: &str) -> ApiResult<()> {
    if !matches(&PHONE_PATTERN, value.trim_end())? {
        return Err(invalid_format(field_name, "phone number"));
    }
    Ok(())
}

/// Validate an absolute http, https or ftp URL.
pub fn validate_absolute_url(field_name: &str, value: &str) -> ApiResult<()> {
    if !matches(&ABSOLUTE_URL_PATTERN, value)? {
        return Err(invalid_format(field_name, "absolute URL"));
    }
    Ok(())
}

/// Validate a candidate submission, reporting the first failing field.
pub fn validate_candidate(payload: &CandidatePayload) -> ApiResult<()> {
    payload.first_name.validate_non_empty("firstName")?;
    payload.last_name.validate_non_empty("lastName")?;
    if let Some(phone) = &payload.phone_number {
        validate_phone("phoneNumber", phone)?;
    }
    validate_email("email", &payload.email)?;
    if let Some(url) = &payload.linked_in_url {
        validate_absolute_url("linkedInUrl", url)?;
    }
    if let Some(url) = &payload.git_hub_url {
        validate_absolute_url("gitHubUrl", url)?;
    }
    payload.comment.validate_non_empty("comment")?;
    Ok(())
}
