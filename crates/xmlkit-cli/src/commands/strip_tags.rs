//! Strip-tags command implementation

use anyhow::Result;
use xmlkit::Xmlkit;

pub fn execute(kit: &Xmlkit, input: &str) -> Result<()> {
    let markup = super::read_input(input)?;
    print!("{}", kit.strip_tags(&markup));
    Ok(())
}
