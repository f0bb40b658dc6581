use std::fmt;

#[derive(Debug)]
pub enum LoadError {
    /// File could not be opened or read.
    Io(String),
    /// Malformed CSV (unbalanced quotes, ragged rows).
    Csv(String),
    /// A required column is absent from the header.
    MissingColumn(String),
    /// A coordinate cell is not a number. `row` is 1-based, header excluded.
    InvalidNumber { row: usize, column: String, value: String },
    /// Header present but no sample rows.
    Empty,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Csv(msg) => write!(f, "CSV error: {msg}"),
            Self::MissingColumn(column) => write!(f, "missing required column '{column}'"),
            Self::InvalidNumber { row, column, value } => {
                write!(f, "row {row}, column '{column}': cannot parse number '{value}'")
            }
            Self::Empty => write!(f, "dataset has no sample rows"),
        }
    }
}

impl std::error::Error for LoadError {}
