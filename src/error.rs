use thiserror::Error;

/// Errors that can occur while preparing or fitting a stroke.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FitError {
    #[error("a stroke needs at least 2 points, got {0}")]
    TooFewPoints(usize),

    #[error("timestamp count ({timestamps}) does not match point count ({points})")]
    TimestampMismatch { points: usize, timestamps: usize },

    #[error("invalid fit configuration: {0}")]
    InvalidConfig(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse stroke file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("render error: {0}")]
    Render(String),
}
