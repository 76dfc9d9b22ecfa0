//! Operation outcomes and the user-facing error taxonomy.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::validation::InvalidReason;

/// Closed set of user-facing failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Timeout,
    /// Superseded by a newer request. Never shown to the user.
    Cancelled,
    Network,
    /// Response body could not be decoded.
    Protocol,
    /// 2xx response with `success: false`.
    Application,
    /// HTTP 400.
    Validation,
    /// HTTP 403.
    Auth,
    /// HTTP 429.
    RateLimit,
    /// HTTP 503.
    Unavailable,
    /// Any other non-2xx status.
    Generic,
    /// Rejected locally before any network call.
    InputInvalid,
}

impl ErrorCategory {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Cancelled => "cancelled",
            Self::Network => "network",
            Self::Protocol => "protocol",
            Self::Application => "application",
            Self::Validation => "validation",
            Self::Auth => "auth",
            Self::RateLimit => "rate_limit",
            Self::Unavailable => "unavailable",
            Self::Generic => "generic",
            Self::InputInvalid => "input_invalid",
        }
    }
}

impl Display for ErrorCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A failure with its category and the message to display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedError {
    category: ErrorCategory,
    message: String,
}

impl ClassifiedError {
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(ErrorCategory::Cancelled, String::new())
    }

    pub fn input_invalid(reason: InvalidReason) -> Self {
        Self::new(ErrorCategory::InputInvalid, reason.message())
    }

    pub const fn category(&self) -> ErrorCategory {
        self.category
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether this failure must stay invisible and leave state untouched.
    pub const fn is_suppressed(&self) -> bool {
        matches!(self.category, ErrorCategory::Cancelled)
    }
}

impl Display for ClassifiedError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.category.code())
    }
}

impl std::error::Error for ClassifiedError {}

/// Either a success payload (with an optional non-fatal warning) or a
/// classified failure.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutcome<T> {
    Success { value: T, warning: Option<String> },
    Failure(ClassifiedError),
}

impl<T> OperationOutcome<T> {
    pub fn success(value: T) -> Self {
        Self::Success {
            value,
            warning: None,
        }
    }

    pub fn failure(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::Failure(ClassifiedError::new(category, message))
    }

    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            Self::Failure(_) => None,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Success { warning, .. } => warning.as_deref(),
            Self::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Success { .. } => None,
            Self::Failure(error) => Some(error),
        }
    }

    /// Maps the success value, keeping the warning.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationOutcome<U> {
        match self {
            Self::Success { value, warning } => OperationOutcome::Success {
                value: f(value),
                warning,
            },
            Self::Failure(error) => OperationOutcome::Failure(error),
        }
    }

    /// Like [`map`](Self::map) but the mapping may fail into a classified error.
    pub fn and_then<U>(
        self,
        f: impl FnOnce(T) -> Result<U, ClassifiedError>,
    ) -> OperationOutcome<U> {
        match self {
            Self::Success { value, warning } => match f(value) {
                Ok(value) => OperationOutcome::Success { value, warning },
                Err(error) => OperationOutcome::Failure(error),
            },
            Self::Failure(error) => OperationOutcome::Failure(error),
        }
    }

    pub fn into_result(self) -> Result<T, ClassifiedError> {
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::Failure(error) => Err(error),
        }
    }
}
