//! Xmlize command implementation
//!
//! Reads any JSON value and writes it as XML. `--pretty` overrides the
//! indentation from the configuration file.

use anyhow::{Context, Result};
use xmlkit::Xmlkit;
use xmlkit::xmlize::{XmlizeOptions, xmlize_value_with};

/// Arguments for the xmlize command.
pub struct XmlizeArgs {
    pub input: String,
    pub tag: String,
    pub pretty: bool,
}

pub fn execute(kit: &Xmlkit, args: XmlizeArgs) -> Result<()> {
    let text = super::read_input(&args.input)?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", args.input))?;

    let options = layout(kit, args.pretty);
    tracing::debug!(tag = %args.tag, ?options, "xmlizing");
    println!("{}", xmlize_value_with(&value, &args.tag, &options));
    Ok(())
}

fn layout(kit: &Xmlkit, pretty: bool) -> XmlizeOptions {
    let mut options = kit.config().xmlize.options();
    if pretty {
        options.indent = XmlizeOptions::pretty().indent;
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlkit::XmlkitConfig;

    fn kit_with_indent(indent: usize) -> Xmlkit {
        let mut config = XmlkitConfig::default();
        config.xmlize.indent = indent;
        config.xmlize.declaration = true;
        Xmlkit::from_config(config)
    }

    #[test]
    fn test_layout_follows_config() {
        let options = layout(&kit_with_indent(2), false);
        assert_eq!(options.indent.as_deref(), Some("  "));
        assert!(options.declaration);
    }

    #[test]
    fn test_pretty_overrides_config_indent() {
        let options = layout(&kit_with_indent(2), true);
        assert_eq!(options.indent.as_deref(), Some("   "));
        // Only the indentation changes
        assert!(options.declaration);
    }
}
