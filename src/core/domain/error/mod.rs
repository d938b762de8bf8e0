use crate::core::infrastructure::http_executor::TransportError;
use thiserror::Error;

/// The main error type for Proxmox API operations.
///
/// Transport failures produced by the [`HttpExecutor`](crate::HttpExecutor)
/// are carried through untouched in [`ProxmoxError::Transport`]; every other
/// variant is raised by this crate before or after the network call.
#[derive(Error, Debug)]
pub enum ProxmoxError {
    /// The HTTP client could not be set up
    ///
    /// # Fields
    /// * `0` - A description of what went wrong while building the client
    #[error("Connection error: {0}")]
    Connection(String),

    /// There is no usable session to attach to a request
    ///
    /// # Fields
    /// * `0` - A description of the authentication state
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The raw credentials did not contain a complete password or token key set
    #[error("Malformed credentials: {0}")]
    MalformedCredentials(String),

    /// A request argument had the wrong shape; no request was sent
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A failure reported by the HTTP executor, propagated unmodified
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response body could not be decoded into the requested format
    #[error("Decode error: {0}")]
    Decode(String),

    /// Represents validation failures with detailed context
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
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

/// Type alias for Results that may fail with a ProxmoxError
pub type ProxmoxResult<T> = Result<T, ProxmoxError>;
