//! Recursive parse configuration

use serde::{Deserialize, Serialize};

/// Default nesting limit for the recursive parser
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Settings for the recursive (BER) parser
///
/// Deserializes with defaults for missing fields, so it can be embedded
/// in a consumer's own configuration file.
///
/// # Usage Example
///
/// ```rust
/// use tcap_ber::ber::ParseConfig;
///
/// let config = ParseConfig::default().with_max_depth(8);
/// assert_eq!(config.max_depth, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    /// Nesting level below which constructed elements are still expanded
    ///
    /// Top-level elements sit at level 0. A constructed element at level
    /// `max_depth` or deeper keeps its raw value but gets no children.
    pub max_depth: usize,
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        assert_eq!(ParseConfig::new().max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: ParseConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ParseConfig::default());

        let config: ParseConfig = serde_json::from_str(r#"{"max_depth": 4}"#).unwrap();
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&ParseConfig::default().with_max_depth(2)).unwrap();
        assert_eq!(json, r#"{"max_depth":2}"#);
    }
}
