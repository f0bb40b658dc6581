// Dataset loading

pub mod csv;
pub mod error;

pub use crate::csv::{load_dataset, parse_dataset};
pub use error::LoadError;

/// Columns every sample file must carry (matched case-insensitively).
pub const SHEET_COLUMN: &str = "toposheet";
pub const LATITUDE_COLUMN: &str = "latitude";
pub const LONGITUDE_COLUMN: &str = "longitude";
