use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};

use crate::error::{ConfigError, KumikiResult};

/// Settings of a parse run.
///
/// ```json
/// { "max_depth": 256, "trace_rules": true }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseConfig {
    /// Maximum rule nesting before the parse aborts.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Log rule entry and exit at debug level.
    #[serde(default)]
    pub trace_rules: bool,

    /// Whether the command line grammars skip whitespace between tokens.
    #[serde(default = "default_true")]
    pub skip_whitespace: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            trace_rules: false,
            skip_whitespace: default_true(),
        }
    }
}

impl ParseConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> KumikiResult<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: ParseConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_str(s: &str) -> KumikiResult<Self> {
        let config: ParseConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidSetting(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_max_depth() -> usize {
    512
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::io::Write;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = ParseConfig::from_str(r#"{ "trace_rules": true }"#).unwrap();
        assert_eq!(config.max_depth, 512);
        assert!(config.trace_rules);
        assert!(config.skip_whitespace);
        assert_eq!(ParseConfig::from_str("{}").unwrap(), ParseConfig::default());
    }

    #[test]
    fn test_zero_depth_is_rejected() {
        let result = ParseConfig::from_str(r#"{ "max_depth": 0 }"#);
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidSetting(_)))
        ));
    }

    #[test]
    fn test_malformed_settings() {
        assert!(matches!(
            ParseConfig::from_str(r#"{ "max_depth": "deep" }"#),
            Err(Error::Settings(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let path = std::env::temp_dir().join(format!("kumiki-config-{}.json", std::process::id()));
        {
            let mut file = File::create(&path).unwrap();
            writeln!(file, r#"{{ "max_depth": 64, "skip_whitespace": false }}"#).unwrap();
        }
        let config = ParseConfig::from_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config.max_depth, 64);
        assert!(!config.skip_whitespace);
        assert!(!config.trace_rules);

        assert!(matches!(
            ParseConfig::from_file(std::env::temp_dir().join("kumiki-missing.json")),
            Err(Error::Io(_))
        ));
    }
}
