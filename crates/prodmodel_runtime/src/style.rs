//! ANSI styling for terminal output.

/// Escape sequences for each kind of output the driver and REPL print.
///
/// Every field is the sequence written before the text; [`Styles::reset`]
/// follows it. An empty string leaves the text unstyled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Styles {
    /// The rule being examined without firing.
    pub current: String,
    /// A rule that fired.
    pub performed: String,
    /// Newly asserted facts.
    pub fact: String,
    /// Headings.
    pub heading: String,
    /// The success verdict.
    pub success: String,
    /// The failure verdict and errors.
    pub failure: String,
    /// Secondary text such as hints.
    pub dim: String,
    /// Sequence that ends a styled span.
    pub reset: String,
}

impl Styles {
    /// The default colour scheme.
    #[must_use]
    pub fn ansi() -> Self {
        Self {
            current: "\x1b[33m".to_string(),
            performed: "\x1b[1;32m".to_string(),
            fact: "\x1b[36m".to_string(),
            heading: "\x1b[1m".to_string(),
            success: "\x1b[1;32m".to_string(),
            failure: "\x1b[31m".to_string(),
            dim: "\x1b[2m".to_string(),
            reset: "\x1b[0m".to_string(),
        }
    }

    /// No escape sequences at all.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            current: String::new(),
            performed: String::new(),
            fact: String::new(),
            heading: String::new(),
            success: String::new(),
            failure: String::new(),
            dim: String::new(),
            reset: String::new(),
        }
    }

    /// Wraps `text` in `style`.
    #[must_use]
    pub fn paint(&self, style: &str, text: &str) -> String {
        if style.is_empty() {
            text.to_string()
        } else {
            format!("{style}{text}{}", self.reset)
        }
    }
}

impl Default for Styles {
    fn default() -> Self {
        Self::ansi()
    }
}
