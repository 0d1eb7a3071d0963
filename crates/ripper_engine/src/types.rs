use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub type RequestId = u64;

/// Body sent to the processing endpoint.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RipRequest<'a> {
    pub target: &'a str,
}

/// Successful processing response. The service may omit either field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct RipResponse {
    pub links: Option<Vec<String>>,
    pub hostnames: Option<BTreeMap<String, u64>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct CountResponse {
    pub count: Option<u64>,
}

/// Optional body of a failure response.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    RipCompleted {
        request_id: RequestId,
        result: Result<RipResponse, ApiError>,
    },
    CountCompleted {
        result: Result<CountResponse, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {detail}")]
pub struct ApiError {
    pub kind: FailureKind,
    /// User-facing text: the service's `message` field or the status text.
    pub message: Option<String>,
    /// Diagnostic detail for logs.
    pub detail: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            message: None,
            detail: detail.into(),
        }
    }

    pub(crate) fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    MalformedBody,
    Network,
}

impl FailureKind {
    /// True when no response was received at all.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FailureKind::InvalidUrl | FailureKind::Timeout | FailureKind::Network
        )
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::MalformedBody => write!(f, "malformed response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
