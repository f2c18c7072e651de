pub mod converter;
pub mod errors;
pub mod golang;
pub mod profile;

pub use converter::{Conversion, ConversionReport, Converter, ProfileSummary};
pub use errors::{ConvertError, ConvertResult, ParseError, ProfileError};
pub use profile::SwitchProfile;
