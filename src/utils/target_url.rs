//! Validation of redirect destinations.
//!
//! Destinations are stored exactly as submitted (a code created for `U` always
//! redirects to `U`), but they must be absolute HTTP(S) URLs.

use url::Url;

/// Upper bound on stored destination length.
pub const MAX_TARGET_URL_LENGTH: usize = 2048;

/// Reasons a destination is rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TargetUrlError {
    #[error("target_url must not be empty")]
    Empty,

    #[error("target_url must not contain surrounding whitespace or control characters")]
    UnsafeCharacters,

    #[error("target_url exceeds {MAX_TARGET_URL_LENGTH} characters")]
    TooLong,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL must include a host")]
    MissingHost,
}

/// Checks that `input` is a usable redirect destination.
///
/// # Rules
///
/// 1. Non-empty after trimming whitespace
/// 2. No surrounding whitespace and no control characters anywhere, since the
///    stored value is sent back verbatim as the `Location` header
/// 3. At most [`MAX_TARGET_URL_LENGTH`] characters
/// 4. Parses as an absolute URL
/// 5. Scheme is `http` or `https` (rejects `javascript:`, `data:`, `file:`, ...)
/// 6. Has a host
///
/// # Errors
///
/// Returns the first violated rule as a [`TargetUrlError`].
pub fn validate_target_url(input: &str) -> Result<(), TargetUrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(TargetUrlError::Empty);
    }

    // `Url::parse` silently strips tab, CR and LF; they must not reach storage.
    if trimmed.len() != input.len() || input.chars().any(char::is_control) {
        return Err(TargetUrlError::UnsafeCharacters);
    }

    if trimmed.len() > MAX_TARGET_URL_LENGTH {
        return Err(TargetUrlError::TooLong);
    }

    let url = Url::parse(trimmed).map_err(|e| TargetUrlError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(TargetUrlError::UnsupportedProtocol),
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(TargetUrlError::MissingHost);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_https() {
        assert!(validate_target_url("https://example.com").is_ok());
    }

    #[test]
    fn test_accepts_http_with_path_and_query() {
        assert!(validate_target_url("http://example.com/a/b?x=1#frag").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate_target_url(""), Err(TargetUrlError::Empty));
        assert_eq!(validate_target_url("   "), Err(TargetUrlError::Empty));
    }

    #[test]
    fn test_rejects_surrounding_whitespace() {
        for url in [" https://example.com", "https://example.com/ ", "https://example.com/\n"] {
            assert_eq!(
                validate_target_url(url),
                Err(TargetUrlError::UnsafeCharacters),
                "{url:?}"
            );
        }
    }

    #[test]
    fn test_rejects_embedded_control_characters() {
        for url in [
            "https://exa\nmple.com/",
            "https://example.com/a\r\nX-Evil: 1",
            "https://example.com/\tpath",
            "https://example.com/\u{7f}",
        ] {
            assert_eq!(
                validate_target_url(url),
                Err(TargetUrlError::UnsafeCharacters),
                "{url:?}"
            );
        }
    }

    #[test]
    fn test_accepted_url_is_a_valid_location_header() {
        let url = "https://example.com/caf%C3%A9?q=a b";
        assert!(validate_target_url(url).is_ok());
        assert!(axum::http::HeaderValue::from_str(url).is_ok());
    }

    #[test]
    fn test_rejects_relative() {
        assert!(matches!(
            validate_target_url("example.com/path"),
            Err(TargetUrlError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_rejects_javascript_scheme() {
        assert_eq!(
            validate_target_url("javascript:alert(1)"),
            Err(TargetUrlError::UnsupportedProtocol)
        );
    }

    #[test]
    fn test_rejects_ftp_scheme() {
        assert_eq!(
            validate_target_url("ftp://example.com/file"),
            Err(TargetUrlError::UnsupportedProtocol)
        );
    }

    #[test]
    fn test_rejects_too_long() {
        let url = format!("https://example.com/{}", "a".repeat(MAX_TARGET_URL_LENGTH));
        assert_eq!(validate_target_url(&url), Err(TargetUrlError::TooLong));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TargetUrlError::Empty.to_string(),
            "target_url must not be empty"
        );
        assert!(
            TargetUrlError::UnsupportedProtocol
                .to_string()
                .contains("HTTP and HTTPS")
        );
    }
}
