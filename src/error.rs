use thiserror::Error;

#[derive(Error, Debug)]
pub enum SubtrackError {
    #[error("No registered format recognized the input")]
    UnrecognizedFormat,

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Invalid time code: {0}")]
    InvalidTimeCode(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SubtrackError>;
