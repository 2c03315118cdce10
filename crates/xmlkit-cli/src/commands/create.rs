//! Create command implementation

use anyhow::{Context, Result};
use xmlkit::Xmlkit;

pub fn execute(kit: &Xmlkit, namespace: Option<&str>, root: Option<&str>) -> Result<()> {
    let doc = kit.create_document(namespace, root).map_err(|err| {
        eprintln!("{}", err.to_diagnostic().to_text());
        err
    })?;
    let markup = kit
        .serialize_to_string(&doc, doc.root())
        .context("host cannot serialize documents")?;
    println!("{}", markup);
    Ok(())
}
