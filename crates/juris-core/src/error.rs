use thiserror::Error;

/// Application-wide error types for Juris.
#[derive(Error, Debug)]
pub enum AppError {
    /// The incoming request was rejected before any source was contacted.
    #[error("{0}")]
    Validation(String),

    /// A source did not answer within its deadline (milliseconds).
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// Network/connection error (DNS, refused, reset).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Any other HTTP or protocol failure, including body reads.
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// HTML extraction could not be set up (bad selector or pattern).
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Source registry is malformed.
    #[error("Registry error: {0}")]
    RegistryError(String),

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// Reason string reported in a per-source error entry.
    ///
    /// Deadline expiry is always reported as the bare word `"timeout"`;
    /// every other failure keeps its classified message.
    pub fn source_reason(&self) -> String {
        match self {
            AppError::Timeout(_) => "timeout".to_string(),
            other => other.to_string(),
        }
    }}
