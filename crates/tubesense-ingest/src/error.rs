use thiserror::Error;

/// Upstream error reasons that mean the credential or its quota is unusable.
const AUTH_REASONS: &[&str] = &[
    "keyInvalid",
    "keyExpired",
    "quotaExceeded",
    "dailyLimitExceeded",
    "accessNotConfigured",
    "ipRefererBlocked",
];

/// Status codes worth another attempt.
const RETRIABLE_STATUS: &[u16] = &[429, 500, 502, 503, 504];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Could not reach the server.
    Connection,
    /// The request exceeded its timeout.
    Timeout,
    /// The server answered with a non-success status.
    Status,
    /// The body was not the JSON shape we expect.
    Malformed,
    /// Any other transport failure.
    Transport,
}

/// A failed call to the remote API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind:?} error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub status: Option<u16>,
    /// First `errors[].reason` from the upstream error body, if any.
    pub reason: Option<String>,
    pub message: String,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            reason: None,
            message: message.into(),
        }
    }

    pub fn http_status(status: u16, reason: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Status,
            status: Some(status),
            reason,
            message: message.into(),
        }
    }

    /// Connection failures, timeouts, and 429/5xx gateway statuses are retried.
    pub fn is_retriable(&self) -> bool {
        match self.kind {
            RemoteErrorKind::Connection | RemoteErrorKind::Timeout => true,
            RemoteErrorKind::Status => self
                .status
                .is_some_and(|s| RETRIABLE_STATUS.contains(&s)),
            RemoteErrorKind::Malformed | RemoteErrorKind::Transport => false,
        }
    }

    /// Whether the failure is about the API key or its quota.
    pub fn is_quota_or_auth(&self) -> bool {
        if self.kind != RemoteErrorKind::Status {
            return false;
        }
        match self.status {
            Some(401) => true,
            Some(400 | 403) => self
                .reason
                .as_deref()
                .is_some_and(|r| AUTH_REASONS.contains(&r)),
            _ => false,
        }
    }
}

/// Failure of a whole collection run.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error("API key missing or rejected: {0}")]
    QuotaOrAuth(String),
    #[error("percentage must be in (0, 1], got {0}")]
    InvalidPercentage(f64),
    #[error("remote API error: {0}")]
    Remote(RemoteError),
}

impl From<RemoteError> for CollectError {
    fn from(err: RemoteError) -> Self {
        if err.is_quota_or_auth() {
            CollectError::QuotaOrAuth(err.to_string())
        } else {
            CollectError::Remote(err)
        }
    }
}

/// A single thread or reply record that could not be parsed. Never fatal.
#[derive(Error, Debug)]
#[error("malformed {record} record: {source}")]
pub struct MalformedRecord {
    pub record: &'static str,
    #[source]
    pub source: serde_json::Error,
}
