use thiserror::Error;

/// Everything that can go wrong during one exchange.
///
/// None of these escape [`crate::ExchangeController::send`]: each is either
/// swallowed, turned into a notification, or masked with the fallback reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("input is empty after trimming")]
    EmptyInput,

    #[error("an exchange is already in flight")]
    Busy,

    #[error("no API key configured")]
    MissingCredential,

    #[error("connection to completion provider failed: {0}")]
    ConnectionFailure(String),

    #[error("completion provider replied without usable text")]
    MalformedReply,
}

impl ExchangeError {
    pub fn connection(detail: impl Into<String>) -> Self {
        ExchangeError::ConnectionFailure(detail.into())
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        ExchangeError::ConnectionFailure(err.to_string())
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ConnectionFailure(format!("invalid JSON body: {err}"))
    }
}

pub type ExchangeResult<T> = Result<T, ExchangeError>;
