use serde::Serialize;

/// Trim and upper-case a caller-supplied ticker. Returns `None` for empty input.
pub fn normalize_symbol(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Outcome of validating a ticker symbol.
///
/// Exactly one of `is_valid` or `error` is set, and `display_name` is only
/// present on a valid result. Fields are private so the only way to build one
/// is through [`ValidationResult::valid`] and [`ValidationResult::invalid`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ValidationResult {
    symbol: String,
    is_valid: bool,
    display_name: Option<String>,
    error: Option<String>,
}

impl ValidationResult {
    pub fn valid(symbol: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            is_valid: true,
            display_name: Some(display_name.into()),
            error: None,
        }
    }

    pub fn invalid(symbol: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            is_valid: false,
            display_name: None,
            error: Some(error.into()),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
