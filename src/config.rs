//! Dispatch configuration.
//!
//! Supports precedence ENV > file > defaults. YAML files need the `config`
//! feature.

use std::env;

#[cfg(feature = "config")]
use std::path::Path;

#[cfg(feature = "config")]
use crate::error::{Error, Result};

/// Environment variable naming a variant to force, e.g. `power_32f_u_sse2`.
pub const ENV_VARIANT: &str = "SIMD_POW_VARIANT";

/// Environment variable that restricts dispatch to the generic variant.
pub const ENV_DISABLE_SIMD: &str = "SIMD_POW_DISABLE_SIMD";

/// How the dispatcher binds variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct DispatchConfig {
    /// Variant name to bind instead of auto-detection.
    #[cfg_attr(feature = "config", serde(default))]
    pub force_variant: Option<String>,

    /// Bind the generic variant even when SIMD is available.
    #[cfg_attr(feature = "config", serde(default))]
    pub disable_simd: bool,
}

impl DispatchConfig {
    /// Creates a configuration with default values (auto-detect).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads [`ENV_VARIANT`] and [`ENV_DISABLE_SIMD`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env()
    }

    /// Overrides fields with any environment variables that are set.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(name) = env::var(ENV_VARIANT) {
            let name = name.trim();
            if !name.is_empty() {
                self.force_variant = Some(name.to_string());
            }
        }
        if let Ok(flag) = env::var(ENV_DISABLE_SIMD) {
            self.disable_simd = parse_flag(&flag);
        }
        self
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[cfg(feature = "config")]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    #[cfg(feature = "config")]
    pub fn parse(yaml: &str) -> Result<Self> {
        serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = DispatchConfig::new();
        assert_eq!(config.force_variant, None);
        assert!(!config.disable_simd);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("off"));
        assert!(!parse_flag(""));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_parse_minimal() {
        let config = DispatchConfig::parse("disable_simd: true").unwrap();
        assert!(config.disable_simd);
        assert_eq!(config.force_variant, None);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_parse_full() {
        let yaml = r#"
force_variant: power_32f_u_sse2
disable_simd: false
"#;
        let config = DispatchConfig::parse(yaml).unwrap();
        assert_eq!(config.force_variant.as_deref(), Some("power_32f_u_sse2"));
        assert!(!config.disable_simd);
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_parse_error_includes_line() {
        let yaml = r#"
force_variant: power_32f_generic
disable_simd: not_a_bool
"#;
        let err = DispatchConfig::parse(yaml).unwrap_err();
        assert!(matches!(err, Error::ConfigParse { line: 3, .. }), "got {err}");
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_load_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "force_variant: power_32f_generic").unwrap();

        let config = DispatchConfig::load(file.path()).unwrap();
        assert_eq!(config.force_variant.as_deref(), Some("power_32f_generic"));
    }

    #[cfg(feature = "config")]
    #[test]
    fn test_config_load_missing_file() {
        let err = DispatchConfig::load("/nonexistent/simd-pow.yaml").unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound(_)));
    }
}
