use thiserror::Error;

#[derive(Error, Debug)]
pub enum YoncaError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    /// Geolocation or weather provider unreachable; recovered by manual entry.
    #[error("Weather resolution failed: {0}")]
    ResolutionFailed(String),

    /// A sub-context required by the farm type is missing or invalid.
    #[error("Incomplete context: {0}")]
    IncompleteContext(String),

    /// The recommendation exchange failed; the user may retry.
    #[error("Advisory service error: {0}")]
    Transport(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<::config::ConfigError> for YoncaError {
    fn from(e: ::config::ConfigError) -> Self {
        YoncaError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, YoncaError>;
