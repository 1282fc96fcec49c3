use std::time::Duration;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// Required configuration was absent after resolution.
    #[error("{0}")]
    MissingField(String),
    /// The transport could not establish or complete the exchange.
    #[error("network error: {0}")]
    Network(String),
    /// The attempt deadline elapsed before the transport finished.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// Non-success HTTP status code with raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// Success status, but the body lacked the expected shape or field.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    /// The request could not be built (bad URL, bad header value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Coarse classification of a [`LoggerError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    MissingField,
    NetworkFailure,
    Timeout,
    /// HTTP 5xx.
    ServerError,
    /// HTTP 429.
    RateLimited,
    /// HTTP 408.
    RequestTimeoutStatus,
    /// Any other non-2xx status.
    ClientError,
    MalformedResponse,
    InvalidRequest,
}

impl ErrorKind {
    /// Whether a failure of this kind is worth another attempt.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::NetworkFailure
                | Self::Timeout
                | Self::ServerError
                | Self::RateLimited
                | Self::RequestTimeoutStatus
        )
    }
}

impl LoggerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::Network(_) => ErrorKind::NetworkFailure,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Http { status, .. } => match *status {
                408 => ErrorKind::RequestTimeoutStatus,
                429 => ErrorKind::RateLimited,
                500..=599 => ErrorKind::ServerError,
                _ => ErrorKind::ClientError,
            },
            Self::MalformedResponse(_) => ErrorKind::MalformedResponse,
            Self::InvalidRequest(_) => ErrorKind::InvalidRequest,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
