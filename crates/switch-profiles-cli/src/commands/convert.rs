use anyhow::{Context, Result};
use console::style;

use crate::configuration::Settings;

pub fn execute(settings: &Settings) -> Result<()> {
    let converter = settings.converter();
    let report = converter
        .run(|conversion| println!("{}", conversion))
        .with_context(|| {
            format!(
                "Conversion from {} stopped; files converted before the failure were kept",
                converter.input_dir().display()
            )
        })?;

    eprintln!(
        "{} converted {} profile(s) into {}",
        style("Done:").bold().green(),
        report.len(),
        converter.output_dir().display()
    );
    Ok(())
}
