//! Common validation utilities.

use validator::ValidationError;

/// Validates that a text field has at least one non-whitespace character.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Value must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates that a list holds at least one non-blank entry.
pub fn validate_non_empty_list(values: &[String]) -> Result<(), ValidationError> {
    if values.iter().any(|v| !v.trim().is_empty()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("empty_list");
        err.message = Some("At least one value is required".into());
        Err(err)
    }
}

/// Validates a backend endpoint URL.
///
/// An empty URL is allowed (it selects demo mode); anything else must be
/// an http(s) URL.
pub fn validate_endpoint_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    if url.is_empty() || url.starts_with("https://") || url.starts_with("http://") {
        Ok(())
    } else {
        let mut err = ValidationError::new("endpoint_url");
        err.message = Some("Endpoint URL must start with http:// or https://".into());
        Err(err)
    }
}
