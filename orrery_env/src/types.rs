//! Common types for the Orrery data-source layer.

use serde::{Deserialize, Serialize};

/// Sortable identifier pairing a reference snapshot with its actual counterpart.
///
/// Producers name one file per timestep after the time (e.g. `2460000.5.bin`
/// for a Julian date); the token is that filename without its extension.
/// Ordering is lexical on the raw string, never numeric.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeToken(String);

impl TimeToken {
    /// Creates a token from a filename stem.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the token as a number, when the producer used numeric names.
    pub fn as_f64(&self) -> Option<f64> {
        self.0.parse::<f64>().ok().filter(|t| t.is_finite())
    }

    /// Filename for this token with the given extension.
    pub fn file_name(&self, extension: &str) -> String {
        if extension.is_empty() {
            self.0.clone()
        } else {
            format!("{}.{}", self.0, extension)
        }
    }
}

impl From<&str> for TimeToken {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for TimeToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl std::fmt::Display for TimeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lexical_ordering() {
        let mut tokens: Vec<TimeToken> = ["2460001.5", "2460000.5", "2460000.0"]
            .into_iter()
            .map(TimeToken::from)
            .collect();
        tokens.sort();

        let sorted: Vec<&str> = tokens.iter().map(|t| t.as_str()).collect();
        assert_eq!(sorted, vec!["2460000.0", "2460000.5", "2460001.5"]);

        // Lexical, not numeric
        assert!(TimeToken::from("10.0") < TimeToken::from("9.0"));
    }

    #[test]
    fn test_numeric_tokens() {
        assert_eq!(TimeToken::from("2460000.5").as_f64(), Some(2460000.5));
        assert_eq!(TimeToken::from("frame_003").as_f64(), None);
        assert_eq!(TimeToken::from("inf").as_f64(), None);
    }

    #[test]
    fn test_file_name() {
        let token = TimeToken::from("0.1");
        assert_eq!(token.file_name("bin"), "0.1.bin");
        assert_eq!(token.file_name(""), "0.1");
    }
}
