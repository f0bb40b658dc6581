use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// No rows for the (sheet, element) pair, or the element is not a column.
    EmptyDataSubset { sheet: String, element: String },
    /// Too few distinct, non-colinear points to interpolate.
    InsufficientData { sheet: String, element: String, found: usize },
    /// The variogram model could not be fit to the experimental semivariance.
    DegenerateVariogram(String),
    /// Any other numerical failure (singular system, failed triangulation).
    InterpolationFailure(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyDataSubset { sheet, element } => {
                write!(f, "no data for element '{element}' on toposheet '{sheet}'")
            }
            Self::InsufficientData { sheet, element, found } => write!(
                f,
                "toposheet '{sheet}', element '{element}': {found} usable point(s), \
                 need at least 3 non-colinear points"
            ),
            Self::DegenerateVariogram(msg) => write!(f, "degenerate variogram: {msg}"),
            Self::InterpolationFailure(msg) => write!(f, "interpolation failed: {msg}"),
        }
    }
}

impl std::error::Error for AnalysisError {}

impl AnalysisError {
    /// Failures that come from the numerical fit rather than from the data selection.
    pub fn is_numerical(&self) -> bool {
        matches!(self, Self::DegenerateVariogram(_) | Self::InterpolationFailure(_))
    }
}
