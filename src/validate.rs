//! URL field validation.

use url::Url;

use crate::error::ValidationError;

/// Checks that `input` is an absolute URL with a scheme and a host.
///
/// The check is purely syntactic; nothing is fetched. Whitespace-only input counts as empty.
///
/// # Example
///
/// ```rust
/// use scannix::validate::validate_url;
/// use scannix::ValidationError;
///
/// assert!(validate_url("https://example.com").is_ok());
/// assert_eq!(validate_url("   "), Err(ValidationError::Empty));
/// assert_eq!(validate_url("not a url"), Err(ValidationError::Invalid));
/// ```
pub fn validate_url(input: &str) -> Result<Url, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::Empty);
    }

    let parsed = Url::parse(input).map_err(|_| ValidationError::Invalid)?;
    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(ValidationError::Invalid),
    }
}
