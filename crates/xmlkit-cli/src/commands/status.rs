//! Status command implementation

use anyhow::{Result, bail};
use xmlkit::Xmlkit;
use xmlkit::host::QuickXmlHost;

pub fn execute(kit: &Xmlkit, input: &str) -> Result<()> {
    let text = super::read_input(input)?;
    let doc = kit.parse_from_string(&text, "text/xml");
    let status = kit.get_parse_status(doc.as_ref());
    println!("{}", status.text);

    if status.is_ok() {
        return Ok(());
    }
    if let Some(diagnostic) = located_diagnostic(&text) {
        eprintln!("{}", diagnostic);
    }
    bail!("{} is not well-formed", input)
}

/// The bundled parser's diagnostic for `text`, pointing at the failing
/// location. `None` when it parses.
pub fn located_diagnostic(text: &str) -> Option<String> {
    QuickXmlHost::new()
        .parse_document(text)
        .err()
        .map(|err| err.to_diagnostic(text).to_text())
}
