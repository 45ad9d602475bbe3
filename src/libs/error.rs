use thiserror::Error;

/// Failures raised while turning LOD tables into peaks, matrices and reports.
///
/// None of these are retried internally. A multi-file run that hits any of
/// them must be discarded as a whole.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Mq2Error {
    /// The marker/group/position block of a table differs from the one
    /// already consolidated
    #[error("the map used in \"{label}\" does not correspond to the map used in at least one other file")]
    MatrixMismatch { label: String },

    /// The LOD column of a table does not carry LOD values
    #[error("\"{label}\" is not supported: it may contain an analysis which does not return LOD values (such as Kruskal-Wallis or permutation test)")]
    UnsupportedAnalysisType { label: String },

    #[error("LOD threshold should be a number, got \"{0}\"")]
    InvalidThreshold(String),

    /// A non-blank cell that should be numeric
    #[error("{label}: row {row} holds a non-numeric value \"{value}\"")]
    InvalidNumber {
        label: String,
        row: usize,
        value: String,
    },

    #[error("{label}: malformed table, {reason}")]
    MalformedTable { label: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Mq2Error>;

/// Parses the LOD significance threshold given on the command line.
///
/// ```
/// assert_eq!(mq2::libs::error::parse_threshold("3").unwrap(), 3.0);
/// assert_eq!(mq2::libs::error::parse_threshold(" 2.5 ").unwrap(), 2.5);
/// assert!(mq2::libs::error::parse_threshold("three").is_err());
/// assert!(mq2::libs::error::parse_threshold("NaN").is_err());
/// ```
pub fn parse_threshold(input: &str) -> Result<f64> {
    match input.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(Mq2Error::InvalidThreshold(input.to_string())),
    }
}

/// Reads a LOD cell; blank cells count as 0.
pub fn parse_lod(label: &str, row: usize, cell: &str) -> Result<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(0.0);
    }
    cell.parse::<f64>().map_err(|_| Mq2Error::InvalidNumber {
        label: label.to_string(),
        row,
        value: cell.to_string(),
    })
}

/// Reads a genetic position; unlike LOD cells, blank positions are rejected.
pub fn parse_position(label: &str, row: usize, cell: &str) -> Result<f64> {
    cell.trim()
        .parse::<f64>()
        .map_err(|_| Mq2Error::InvalidNumber {
            label: label.to_string(),
            row,
            value: cell.to_string(),
        })
}
