use thiserror::Error;

/// Failure of a single request/response exchange with the device.
///
/// The variants only carry detail for logs. Callers treat every variant the
/// same way: log it and keep the last known state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("invalid request path '{0}': must be relative to the device base url")]
    InvalidPath(String),
    #[error("device unreachable: {0}")]
    Unreachable(String),
    #[error("device answered {status} for {path}")]
    Status { path: String, status: u16 },
    #[error("malformed response from {path}: {detail}")]
    Malformed { path: String, detail: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("target temperature {value} outside {min}..={max}")]
    TargetOutOfRange { value: i64, min: u8, max: u8 },
    #[error("invalid target temperature '{0}'")]
    InvalidTarget(String),
    #[error("unknown mode '{0}'")]
    UnknownMode(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}
