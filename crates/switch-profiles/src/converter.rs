use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{ConvertError, ConvertResult, ProfileError};
use crate::profile::SwitchProfile;

pub const DEFAULT_INPUT_DIR: &str = "switch_profiles";
pub const DEFAULT_OUTPUT_DIR: &str = "src/frontend/switch_profiles";
pub const DEFAULT_PATTERN: &str = "*.go";

/// One input file and the JSON file produced (or planned) for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conversion {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl fmt::Display for Conversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Converted {} to {}",
            self.input.display(),
            self.output.display()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionReport {
    pub conversions: Vec<Conversion>,
}

impl ConversionReport {
    pub fn len(&self) -> usize {
        self.conversions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversions.is_empty()
    }
}

/// Model name and display name, as listed in the front-end's model picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileSummary {
    pub model: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct Converter {
    input_dir: PathBuf,
    output_dir: PathBuf,
    pattern: String,
}

impl Converter {
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            pattern: DEFAULT_PATTERN.to_string(),
        }
    }

    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Files in the input directory whose names match the pattern, sorted by path.
    pub fn inputs(&self) -> ConvertResult<Vec<PathBuf>> {
        let matcher: GlobMatcher = Glob::new(&self.pattern)?.compile_matcher();
        let enumerate_err = |source| ConvertError::Enumerate {
            dir: self.input_dir.clone(),
            source,
        };

        let mut inputs = Vec::new();
        for entry in fs::read_dir(&self.input_dir).map_err(enumerate_err)? {
            let path = entry.map_err(enumerate_err)?.path();
            if !path.is_file() {
                continue;
            }
            if path
                .file_name()
                .is_some_and(|name| matcher.is_match(Path::new(name)))
            {
                inputs.push(path);
            }
        }
        inputs.sort();
        debug!(
            dir = %self.input_dir.display(),
            pattern = %self.pattern,
            count = inputs.len(),
            "enumerated profile sources"
        );
        Ok(inputs)
    }

    /// `<output_dir>/<input base name without extension>.json`
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let stem = input.file_stem().unwrap_or_else(|| input.as_os_str());
        let mut name = stem.to_os_string();
        name.push(".json");
        self.output_dir.join(name)
    }

    /// Converts every input in order, stopping at the first failure.
    ///
    /// Outputs written before a failure are left in place.
    pub fn run(&self, mut progress: impl FnMut(&Conversion)) -> ConvertResult<ConversionReport> {
        let mut report = ConversionReport::default();
        for input in self.inputs()? {
            let profile = load_profile(&input)?;
            let json = render(&input, &profile)?;
            let output = self.output_path(&input);
            fs::write(&output, json).map_err(|source| ConvertError::Write {
                path: output.clone(),
                source,
            })?;

            let conversion = Conversion { input, output };
            progress(&conversion);
            report.conversions.push(conversion);
        }
        info!(
            converted = report.len(),
            output_dir = %self.output_dir.display(),
            "conversion run finished"
        );
        Ok(report)
    }

    /// Parses, validates and serializes every input without writing anything.
    pub fn check(&self) -> ConvertResult<ConversionReport> {
        let mut report = ConversionReport::default();
        for input in self.inputs()? {
            let profile = load_profile(&input)?;
            render(&input, &profile)?;
            let output = self.output_path(&input);
            report.conversions.push(Conversion { input, output });
        }
        info!(checked = report.len(), "check finished");
        Ok(report)
    }

    pub fn list(&self) -> ConvertResult<Vec<ProfileSummary>> {
        self.inputs()?
            .iter()
            .map(|input| {
                load_profile(input).map(|profile| ProfileSummary {
                    model: profile.name,
                    name: profile.spec.display_name,
                })
            })
            .collect()
    }
}

/// Reads one Go source file and turns it into a validated profile.
pub fn load_profile(path: &Path) -> ConvertResult<SwitchProfile> {
    let source = fs::read_to_string(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = source.len(), "parsing profile");

    SwitchProfile::from_go_source(&source).map_err(|err| {
        let path = path.to_path_buf();
        match err {
            ProfileError::Parse(source) => ConvertError::Parse { path, source },
            ProfileError::Decode(source) => ConvertError::Decode { path, source },
            ProfileError::Invalid(problems) => ConvertError::Invalid { path, problems },
        }
    })
}

fn render(path: &Path, profile: &SwitchProfile) -> ConvertResult<String> {
    profile.to_json().map_err(|source| ConvertError::Serialize {
        path: path.to_path_buf(),
        source,
    })
}
