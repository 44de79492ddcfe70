use crate::output::CliError;
use tickety_core::error::ErrorCode;

pub const MIN_TITLE_LEN: usize = 3;
pub const MAX_TITLE_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: String,
    pub reason: String,
    pub suggestion: String,
    pub code: ErrorCode,
}

impl ValidationError {
    pub fn new(
        field: &'static str,
        value: impl Into<String>,
        reason: impl Into<String>,
        suggestion: impl Into<String>,
        code: ErrorCode,
    ) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
            suggestion: suggestion.into(),
            code,
        }
    }

    pub fn to_cli_error(&self) -> CliError {
        CliError::with_details(
            format!("invalid {} '{}': {}", self.field, self.value, self.reason),
            self.suggestion.clone(),
            self.code.code(),
        )
    }
}

/// Validate a ticket title and return it trimmed.
///
/// Titles are required and must be at least [`MIN_TITLE_LEN`] characters once
/// surrounding whitespace is removed.
pub fn validate_title(s: &str) -> Result<String, ValidationError> {
    let title = s.trim();
    let len = title.chars().count();
    if len < MIN_TITLE_LEN {
        return Err(ValidationError::new(
            "title",
            s,
            format!("title is required (min {MIN_TITLE_LEN} chars)"),
            "provide a longer --title",
            ErrorCode::InvalidTitle,
        ));
    }
    if len > MAX_TITLE_LEN {
        return Err(ValidationError::new(
            "title",
            s,
            format!("must be <= {MAX_TITLE_LEN} characters"),
            "shorten the title",
            ErrorCode::InvalidTitle,
        ));
    }
    if title.chars().any(char::is_control) {
        return Err(ValidationError::new(
            "title",
            s,
            "must not contain control characters",
            "remove control characters from the title",
            ErrorCode::InvalidTitle,
        ));
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_trimmed() {
        assert_eq!(validate_title("  Fix login bug ").unwrap(), "Fix login bug");
    }

    #[test]
    fn title_minimum_counts_after_trim() {
        assert!(validate_title("abc").is_ok());
        let err = validate_title("  ab  ").unwrap_err();
        assert_eq!(err.field, "title");
        assert!(err.reason.contains("min 3"));
        assert!(validate_title("").is_err());
    }

    #[test]
    fn title_maximum_is_in_characters() {
        assert!(validate_title(&"é".repeat(MAX_TITLE_LEN)).is_ok());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
    }

    #[test]
    fn title_rejects_control_characters() {
        let err = validate_title("bad\u{7}title").unwrap_err();
        assert!(err.reason.contains("control"));
    }

    #[test]
    fn cli_error_uses_stable_code() {
        let err = validate_title("no").unwrap_err().to_cli_error();
        assert_eq!(err.error_code.as_deref(), Some("E2006"));
        assert!(err.message.contains("title"));
    }
}
