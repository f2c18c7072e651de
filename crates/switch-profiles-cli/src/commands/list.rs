use anyhow::{Context, Result};
use switch_profiles::ProfileSummary;

use crate::configuration::Settings;

pub fn execute(settings: &Settings, json: bool) -> Result<()> {
    let converter = settings.converter();
    let models = converter
        .list()
        .with_context(|| format!("Failed to list profiles in {}", converter.input_dir().display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    print!("{}", table(&models));
    Ok(())
}

/// One line per model, names aligned after the widest model.
fn table(models: &[ProfileSummary]) -> String {
    // `{:width$}` pads by characters, not bytes
    let width = models
        .iter()
        .map(|m| m.model.chars().count())
        .max()
        .unwrap_or(0);
    models
        .iter()
        .map(|m| format!("{:width$}  {}\n", m.model, m.name, width = width))
        .collect()
}
