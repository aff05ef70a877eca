use thiserror::Error;

pub type Result<T> = std::result::Result<T, EsError>;

#[derive(Debug, Error)]
pub enum EsError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for EsError {
    fn from(err: reqwest::Error) -> Self {
        EsError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for EsError {
    fn from(err: serde_json::Error) -> Self {
        EsError::Parse(err.to_string())
    }
}
