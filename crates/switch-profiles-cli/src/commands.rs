pub mod check;
pub mod convert;
pub mod list;
pub mod version;
