use thiserror::Error;

/// Errors produced by the numerical routines of this crate
#[derive(Error, Debug)]
pub enum SunpathError {
    /// A parameter is outside its admissible range
    #[error("Invalid parameter: {param} = {value} ({reason})")]
    InvalidParameter {
        param: &'static str,
        value: f64,
        reason: &'static str,
    },

    /// An operation received no samples or no points
    #[error("Empty input: {0}")]
    EmptyInput(&'static str),

    /// Two arrays that must be paired have different lengths
    #[error("Length mismatch: {what} has {found} entries, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// The gift-wrapping walk did not return to its starting vertex
    #[error("Convex hull did not close after {steps} steps on {points} points")]
    DegenerateHull { points: usize, steps: usize },

    /// An iterative decomposition ran out of iterations
    #[error("No convergence computing {what} after {iterations} iterations")]
    NoConvergence {
        what: &'static str,
        iterations: usize,
    },

    /// A text table or element set could not be parsed
    #[error("Parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Unknown Runge-Kutta scheme: {0}")]
    UnknownScheme(String),

    #[error("Unknown planet: {0}")]
    UnknownPlanet(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, SunpathError>;

impl SunpathError {
    pub(crate) fn invalid(param: &'static str, value: f64, reason: &'static str) -> Self {
        SunpathError::InvalidParameter {
            param,
            value,
            reason,
        }
    }
}
