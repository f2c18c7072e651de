use anyhow::{Context, Result};
use console::style;

use crate::configuration::Settings;

pub fn execute(settings: &Settings) -> Result<()> {
    let converter = settings.converter();
    let report = converter
        .check()
        .with_context(|| format!("Check of {} failed", converter.input_dir().display()))?;

    for conversion in &report.conversions {
        println!(
            "{} would be written to {}",
            conversion.input.display(),
            conversion.output.display()
        );
    }
    eprintln!(
        "{} {} profile(s) are valid",
        style("OK:").bold().green(),
        report.len()
    );
    Ok(())
}
