//! Identifier validation shared by tenant and chain ids

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::DomainError;

/// Maximum length for tenant and chain identifiers
pub const MAX_ID_LENGTH: usize = 50;

/// Alphanumeric and hyphens, starting and ending with an alphanumeric character
static ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]*[a-zA-Z0-9]$|^[a-zA-Z0-9]$")
        .expect("identifier pattern is a valid regex")
});

/// Validate an identifier, using `label` ("Tenant", "Chain") in error messages
pub fn validate_identifier(label: &str, id: &str) -> Result<(), DomainError> {
    if id.is_empty() {
        return Err(DomainError::invalid_id(format!("{} ID cannot be empty", label)));
    }

    if id.len() > MAX_ID_LENGTH {
        return Err(DomainError::invalid_id(format!(
            "{} ID exceeds maximum length of {} characters",
            label, MAX_ID_LENGTH
        )));
    }

    if !ID_PATTERN.is_match(id) {
        return Err(DomainError::invalid_id(format!(
            "Invalid {} ID '{}': must be alphanumeric with hyphens, start and end with alphanumeric",
            label.to_lowercase(),
            id
        )));
    }

    Ok(())
}
