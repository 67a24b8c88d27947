//! Error type shared across the extraction pipeline.

/// Reasons why construction or a processing call may fail.
#[derive(Clone, Debug, PartialEq)]
pub enum ExtractionError {
    /// The input cloud does not match the configured image dimensions.
    DimensionMismatch {
        expected_rows: usize,
        found_rows: usize,
        found_cols: usize,
    },
    /// A parameter value is out of range, malformed, or unknown.
    InvalidConfig { message: String },
    /// A plane fit was requested on fewer than three points.
    InsufficientPoints { found: usize },
    /// A cell index escaped the grid during region growing.
    IndexOutOfRange { index: usize, bound: usize },
}

impl std::fmt::Display for ExtractionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionError::DimensionMismatch {
                expected_rows,
                found_rows,
                found_cols,
            } => write!(
                f,
                "input cloud has shape ({found_rows}, {found_cols}), expected ({expected_rows}, 3)"
            ),
            ExtractionError::InvalidConfig { message } => {
                write!(f, "invalid configuration: {message}")
            }
            ExtractionError::InsufficientPoints { found } => {
                write!(f, "plane fit needs at least 3 points, got {found}")
            }
            ExtractionError::IndexOutOfRange { index, bound } => {
                write!(f, "cell index {index} out of range (grid has {bound} cells)")
            }
        }
    }
}

impl std::error::Error for ExtractionError {}
