//! Kit configuration.
//!
//! ```toml
//! [construction]
//! order = ["native-namespaced", "markup-fallback", "native-plain"]
//!
//! [diagnostics]
//! order = ["absent-document", "error-document", "nested-error-element", "parse-error-property"]
//!
//! [parser]
//! error-reporting = "error-document"
//!
//! [xmlize]
//! indent = 3
//! declaration = true
//! ```
//!
//! Every section and key is optional; missing ones take their defaults.

use crate::error::Result;
use crate::host::ErrorReporting;
use crate::strategy::{ConstructionStrategy, DiagnosticConvention};
use crate::xmlize::XmlizeOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct XmlkitConfig {
    pub construction: ConstructionConfig,
    pub diagnostics: DiagnosticsConfig,
    pub parser: ParserConfig,
    pub xmlize: XmlizeConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConstructionConfig {
    pub order: Vec<ConstructionStrategy>,
}

impl Default for ConstructionConfig {
    fn default() -> Self {
        Self {
            order: ConstructionStrategy::DEFAULT_ORDER.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct DiagnosticsConfig {
    pub order: Vec<DiagnosticConvention>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            order: DiagnosticConvention::DEFAULT_ORDER.to_vec(),
        }
    }
}

/// Settings for the bundled quick-xml host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParserConfig {
    pub error_reporting: ErrorReporting,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct XmlizeConfig {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
    /// Prepend `<?xml version="1.0"?>`.
    pub declaration: bool,
}

impl XmlizeConfig {
    pub fn options(&self) -> XmlizeOptions {
        XmlizeOptions {
            indent: (self.indent > 0).then(|| " ".repeat(self.indent)),
            declaration: self.declaration,
        }
    }
}

impl XmlkitConfig {
    /// Parse a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for malformed TOML, unknown keys or unknown
    /// strategy names.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read, `Error::Config` if it
    /// does not parse.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading xmlkit configuration");
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_empty_config_is_default() {
        let config = XmlkitConfig::from_toml_str("").unwrap();
        assert_eq!(config, XmlkitConfig::default());
        assert_eq!(config.xmlize.options(), XmlizeOptions::default());
    }

    #[test]
    fn test_partial_config() {
        let config = XmlkitConfig::from_toml_str(
            r#"
            [construction]
            order = ["markup-fallback"]

            [parser]
            error-reporting = "parse-error-property"

            [xmlize]
            indent = 3
            "#,
        )
        .unwrap();
        assert_eq!(
            config.construction.order,
            vec![ConstructionStrategy::MarkupFallback]
        );
        assert_eq!(config.diagnostics, DiagnosticsConfig::default());
        assert_eq!(
            config.parser.error_reporting,
            ErrorReporting::ParseErrorProperty
        );
        assert_eq!(config.xmlize.options().indent.as_deref(), Some("   "));
        assert!(!config.xmlize.declaration);
    }

    #[test]
    fn test_unknown_strategy_is_rejected() {
        let err = XmlkitConfig::from_toml_str("[construction]\norder = [\"activex\"]").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(XmlkitConfig::from_toml_str("[xmlize]\nindnet = 2").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = XmlkitConfig::load("/nonexistent/xmlkit.toml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
