use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised by the escrow workflow.
///
/// Every variant maps onto a stable [`ErrorKind`] so callers can branch on the
/// failure class without parsing messages.
#[derive(Error, Diagnostic, Debug)]
pub enum EscrowError {
    #[error("Validation error: {0}")]
    #[diagnostic(code(escrow::validation))]
    Validation(String),
    #[error("Invalid transition: {0}")]
    #[diagnostic(code(escrow::invalid_transition))]
    InvalidTransition(String),
    #[error("Already exists: {0}")]
    #[diagnostic(code(escrow::already_exists))]
    AlreadyExists(String),
    #[error("Order {0} is already fully paid")]
    #[diagnostic(code(escrow::already_settled))]
    AlreadySettled(String),
    #[error("Organization {0} has no registered bank details")]
    #[diagnostic(code(escrow::missing_bank_details))]
    MissingBankDetails(String),
    #[error("Payment of {attempted} exceeds the outstanding balance of {outstanding}")]
    #[diagnostic(code(escrow::overpayment))]
    Overpayment {
        attempted: Decimal,
        outstanding: Decimal,
    },
    #[error("Not found: {0}")]
    #[diagnostic(code(escrow::not_found))]
    NotFound(String),
    #[error("Upstream unavailable: {0}")]
    #[diagnostic(code(escrow::upstream_unavailable), help("the request is safe to retry"))]
    UpstreamUnavailable(String),
    #[error("Configuration error: {0}")]
    #[diagnostic(code(escrow::config))]
    Config(String),
    #[error("IO error: {0}")]
    #[diagnostic(code(escrow::io))]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    #[diagnostic(code(escrow::csv))]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    #[diagnostic(code(escrow::json))]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for EscrowError {
    fn from(e: rocksdb::Error) -> Self {
        EscrowError::UpstreamUnavailable(format!("storage: {}", e))
    }
}

/// Machine-readable failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InvalidTransition,
    AlreadyExists,
    AlreadySettled,
    MissingBankDetails,
    Overpayment,
    NotFound,
    UpstreamUnavailable,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::AlreadyExists => "already_exists",
            ErrorKind::AlreadySettled => "already_settled",
            ErrorKind::MissingBankDetails => "missing_bank_details",
            ErrorKind::Overpayment => "overpayment",
            ErrorKind::NotFound => "not_found",
            ErrorKind::UpstreamUnavailable => "upstream_unavailable",
            ErrorKind::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl EscrowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EscrowError::Validation(_) | EscrowError::Json(_) => ErrorKind::Validation,
            EscrowError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            EscrowError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            EscrowError::AlreadySettled(_) => ErrorKind::AlreadySettled,
            EscrowError::MissingBankDetails(_) => ErrorKind::MissingBankDetails,
            EscrowError::Overpayment { .. } => ErrorKind::Overpayment,
            EscrowError::NotFound(_) => ErrorKind::NotFound,
            EscrowError::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            EscrowError::Config(_) | EscrowError::Io(_) | EscrowError::Csv(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Only upstream failures may be retried with the same request.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::UpstreamUnavailable
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        EscrowError::Validation(msg.into())
    }

    pub(crate) fn transition(msg: impl Into<String>) -> Self {
        EscrowError::InvalidTransition(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EscrowError>;
