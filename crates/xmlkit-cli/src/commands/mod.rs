//! Command implementations for the xmlkit CLI
//!
//! Each command module handles the CLI interface and delegates to the
//! xmlkit library for the actual work.

pub mod create;
pub mod status;
pub mod strip_tags;
pub mod text;
pub mod xmlize;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use xmlkit::{Xmlkit, XmlkitConfig};

/// Build the kit every command runs on, from `config` if given.
pub fn build_kit(config: Option<&Path>) -> Result<Xmlkit> {
    let config = match config {
        Some(path) => XmlkitConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => XmlkitConfig::default(),
    };
    Ok(Xmlkit::from_config(config))
}

/// Read a whole input; `-` reads stdin.
pub fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("failed to read {}", input))
    }
}

/// Read and parse an XML input with the kit's host.
pub fn parse_input(kit: &Xmlkit, input: &str) -> Result<xmlkit::XmlDocument> {
    let text = read_input(input)?;
    kit.parse_from_string(&text, "text/xml")
        .with_context(|| format!("host '{}' cannot parse XML", kit.host().name()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use xmlkit::host::ErrorReporting;

    #[test]
    fn test_build_kit_without_config() {
        let kit = build_kit(None).unwrap();
        assert_eq!(kit.config().xmlize.indent, 0);
    }

    #[test]
    fn test_build_kit_loads_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("xmlkit.toml");
        std::fs::write(
            &path,
            "[parser]\nerror-reporting = \"parse-error-property\"\n\n[xmlize]\nindent = 4\n",
        )
        .unwrap();

        let kit = build_kit(Some(&path)).unwrap();
        assert_eq!(kit.config().parser.error_reporting, ErrorReporting::ParseErrorProperty);
        assert_eq!(kit.config().xmlize.indent, 4);
    }

    #[test]
    fn test_build_kit_reports_bad_config() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("xmlkit.toml");
        std::fs::write(&path, "[xmlize]\nindnet = 2\n").unwrap();

        let err = build_kit(Some(&path)).unwrap_err();
        assert!(err.to_string().starts_with("failed to load configuration"));

        let missing = temp.path().join("missing.toml");
        assert!(build_kit(Some(&missing)).is_err());
    }

    #[test]
    fn test_read_input_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("in.xml");
        std::fs::write(&path, "<root/>").unwrap();

        let input = path.to_string_lossy();
        assert_eq!(read_input(&input).unwrap(), "<root/>");
        let doc = parse_input(&build_kit(None).unwrap(), &input).unwrap();
        assert!(doc.document_element().is_some());
    }
}
