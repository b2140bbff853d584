//! Shared error type across sliprobe crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed query.
    BadRequest,
    /// Deliberate failure produced by the workload endpoint.
    SimulatedFailure,
    /// Instrument name registered twice.
    DuplicateMetric,
    /// Instrument lookup for a name that was never registered.
    UnknownMetric,
    /// Metric or label name outside the exposition grammar.
    InvalidName,
    /// Label values do not fit the instrument's schema.
    LabelMismatch,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::SimulatedFailure => "simulated",
            ClientCode::DuplicateMetric => "DUPLICATE_METRIC",
            ClientCode::UnknownMetric => "UNKNOWN_METRIC",
            ClientCode::InvalidName => "INVALID_NAME",
            ClientCode::LabelMismatch => "LABEL_MISMATCH",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ProbeError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("simulated failure")]
    SimulatedFailure,
    #[error("metric already registered: {0}")]
    DuplicateMetric(String),
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("metric {name} is a {actual}, not a {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("metric {name} expects {expected} label values, got {got}")]
    LabelArity {
        name: String,
        expected: usize,
        got: usize,
    },
    #[error("invalid buckets: {0}")]
    InvalidBuckets(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl ProbeError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            ProbeError::BadRequest(_) | ProbeError::InvalidBuckets(_) => ClientCode::BadRequest,
            ProbeError::SimulatedFailure => ClientCode::SimulatedFailure,
            ProbeError::DuplicateMetric(_) => ClientCode::DuplicateMetric,
            ProbeError::UnknownMetric(_) => ClientCode::UnknownMetric,
            ProbeError::InvalidName(_) => ClientCode::InvalidName,
            ProbeError::KindMismatch { .. } | ProbeError::LabelArity { .. } => {
                ClientCode::LabelMismatch
            }
            ProbeError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            ProbeError::Internal(_) => ClientCode::Internal,
        }
    }
}
