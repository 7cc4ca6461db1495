use serde::Serialize;
use thiserror::Error;

/// Status reported for failures where no HTTP response was received.
pub const NETWORK_ERROR_STATUS: u16 = 0;

/// The main error type for console operations.
///
/// This enum represents every failure the client core can produce:
/// transport failures, non-2xx responses, responses that do not match
/// the expected envelope, client-side validation, and lifecycle errors.
#[derive(Error, Debug)]
pub enum ConsoleError {
    /// No response was received (connection refused, DNS, TLS, timeout)
    ///
    /// # Fields
    /// * `0` - A description of what went wrong on the transport
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    ///
    /// # Fields
    /// * `status` - The HTTP status code
    /// * `message` - The server-provided reason, or the canonical reason phrase
    /// * `payload` - The raw server body, when one was sent
    #[error("HTTP error ({status}): {message}")]
    Http {
        status: u16,
        message: String,
        payload: Option<serde_json::Value>,
    },

    /// A 2xx response whose body does not decode into the expected envelope
    ///
    /// # Fields
    /// * `status` - The HTTP status code of the response
    /// * `message` - The decoder's description of the mismatch
    #[error("Unexpected response shape ({status}): {message}")]
    Shape { status: u16, message: String },

    /// Input rejected before any request was sent
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid or incomplete client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The operation was cancelled before it settled
    #[error("Operation cancelled")]
    Cancelled,

    /// The store was disposed; no further operations are accepted
    #[error("Store has been disposed")]
    Disposed,
}

impl ConsoleError {
    /// Returns the HTTP status associated with this error.
    ///
    /// Network failures report [`NETWORK_ERROR_STATUS`]; errors raised
    /// before a request was sent report `None`.
    pub fn status(&self) -> Option<u16> {
        match self {
            ConsoleError::Network(_) => Some(NETWORK_ERROR_STATUS),
            ConsoleError::Http { status, .. } | ConsoleError::Shape { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::Network(_) => ErrorKind::Network,
            ConsoleError::Http { .. } => ErrorKind::Http,
            ConsoleError::Shape { .. } => ErrorKind::Shape,
            ConsoleError::Validation(_) => ErrorKind::Validation,
            ConsoleError::Configuration(_) => ErrorKind::Configuration,
            ConsoleError::Cancelled => ErrorKind::Cancelled,
            ConsoleError::Disposed => ErrorKind::Disposed,
        }
    }

    /// Converts the error into the uniform shape stored in slice state.
    pub fn normalize(&self) -> NormalizedError {
        let message = match self {
            ConsoleError::Http { message, .. } | ConsoleError::Shape { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        };
        let payload = match self {
            ConsoleError::Http { payload, .. } => payload.clone(),
            _ => None,
        };

        NormalizedError {
            kind: self.kind(),
            status: self.status().unwrap_or(NETWORK_ERROR_STATUS),
            message,
            payload,
        }
    }
}

/// Category of a [`ConsoleError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Http,
    Shape,
    Validation,
    Configuration,
    Cancelled,
    Disposed,
}

/// Uniform error shape produced regardless of where a failure came from.
///
/// `status` is the HTTP status, or `0` when no response was received or the
/// failure happened before a request was sent. `payload` carries the raw
/// server body untouched so consumers can interpret backend-specific fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedError {
    pub kind: ErrorKind,
    pub status: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

impl ValidationError {
    pub(crate) fn field(field: &str, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Type alias for Results that may fail with a ConsoleError
pub type ConsoleResult<T> = Result<T, ConsoleError>;
