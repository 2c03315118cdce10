//! Text command implementation

use anyhow::Result;
use xmlkit::Xmlkit;

pub fn execute(kit: &Xmlkit, input: &str, normalize: bool) -> Result<()> {
    let doc = super::parse_input(kit, input)?;
    let status = kit.get_parse_status(Some(&doc));
    if !status.is_ok() {
        tracing::warn!(input, error = %status.text, "input has parse errors");
    }
    println!("{}", kit.get_text(&doc, doc.root(), normalize));
    Ok(())
}
