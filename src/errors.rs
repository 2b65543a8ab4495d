use thiserror::Error;

/// Error type that captures failures at the crate's external boundaries.
///
/// Store mutations never produce one of these: a mutation that cannot apply is
/// a no-op. Errors only surface while decoding, reading, or writing external
/// documents, and always before any in-memory state is replaced.
#[derive(Debug, Error)]
pub enum JarsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid share payload: {0}")]
    ShareDecode(#[from] ShareDecodeError),
    #[error("Invalid month `{0}`, expected YYYY-MM")]
    InvalidMonth(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, JarsError>;

/// Failures reported by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] JarsError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

/// Reasons a compact share payload can be rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShareDecodeError {
    #[error("payload is not valid base64")]
    Base64,
    #[error("payload is not valid UTF-8 text")]
    Utf8,
    #[error("expected at least 7 fields, found {found}")]
    FieldCount { found: usize },
    #[error("field {position} holds `{value}`, expected a percentage between 0 and 100")]
    Percentage { position: usize, value: String },
}
