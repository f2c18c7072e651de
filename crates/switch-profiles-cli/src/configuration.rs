use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use switch_profiles::converter::{DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_PATTERN};
use switch_profiles::Converter;

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "switch-profiles";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub pattern: String,
}

/// Values given on the command line, which win over every other source.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub pattern: Option<String>,
}

impl Settings {
    /// Defaults, then the config file, then `SWITCH_PROFILES_*` environment variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE_NAME).required(false),
        };

        let config = Config::builder()
            .set_default("input_dir", DEFAULT_INPUT_DIR)?
            .set_default("output_dir", DEFAULT_OUTPUT_DIR)?
            .set_default("pattern", DEFAULT_PATTERN)?
            .add_source(file)
            .add_source(
                Environment::with_prefix("SWITCH_PROFILES")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let settings: Self = config.try_deserialize()?;
        tracing::debug!(?settings, "loaded settings");
        Ok(settings)
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(input_dir) = overrides.input_dir {
            self.input_dir = input_dir;
        }
        if let Some(output_dir) = overrides.output_dir {
            self.output_dir = output_dir;
        }
        if let Some(pattern) = overrides.pattern {
            self.pattern = pattern;
        }
        self
    }

    pub fn converter(&self) -> Converter {
        Converter::new(&self.input_dir, &self.output_dir).with_pattern(&self.pattern)
    }
}
