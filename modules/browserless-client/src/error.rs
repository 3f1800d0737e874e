use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrowserlessError>;

#[derive(Debug, Error)]
pub enum BrowserlessError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Navigation timed out: {0}")]
    Timeout(String),

    #[error("Session state error: {0}")]
    Session(String),
}

impl From<reqwest::Error> for BrowserlessError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BrowserlessError::Timeout(err.to_string())
        } else {
            BrowserlessError::Network(err.to_string())
        }
    }
}

impl BrowserlessError {
    /// Whether this failure is worth retrying with a laxer wait condition.
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserlessError::Timeout(_))
            || matches!(self, BrowserlessError::Api { status: 408, .. })
    }
}
