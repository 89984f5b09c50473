use backtrace::Backtrace;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;
use std::sync::Arc;

/// Error kinds for repository and store operations.
///
/// The kinds fall into three families:
///
/// - **Argument errors** (`InvalidArgument`): a required input was missing or empty,
///   e.g. an empty field-assignment list or an entity without an identity value.
/// - **Mapping errors** (`MappingError`, `ObjectMappingError`): a document type has no
///   usable identity mapping, or a value could not be converted to/from a document.
/// - **Store errors** (everything reported by a store collaborator): these are propagated
///   to the caller unchanged and are never downgraded to a `false` result.
///
/// # Examples
///
/// ```rust
/// use docrepo::errors::{ErrorKind, RepoError, RepoResult};
///
/// fn example() -> RepoResult<()> {
///     Err(RepoError::new("no fields to update", ErrorKind::InvalidArgument))
/// }
///
/// assert_eq!(example().unwrap_err().kind(), &ErrorKind::InvalidArgument);
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A required argument was missing, empty or otherwise unusable
    InvalidArgument,
    /// The document type has no identity attribute mapped
    MappingError,
    /// A value could not be converted to or from its document representation
    ObjectMappingError,
    /// A filter could not be evaluated
    FilterError,
    /// The operation is not valid in the current context
    InvalidOperation,

    /// A document with the same identity already exists
    DuplicateKey,
    /// A write tried to change an immutable field such as the identity
    ImmutableField,
    /// One or more operations of a bulk write failed
    BulkWriteError,
    /// The store handle has already been closed
    StoreClosed,
    /// Generic failure reported by a storage backend
    BackendError,

    /// Internal error (usually indicates a bug)
    InternalError,
}

impl ErrorKind {
    /// Returns `true` for kinds that originate in the store collaborator.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::DuplicateKey
                | ErrorKind::ImmutableField
                | ErrorKind::BulkWriteError
                | ErrorKind::StoreClosed
                | ErrorKind::BackendError
        )
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "Invalid argument"),
            ErrorKind::MappingError => write!(f, "Mapping error"),
            ErrorKind::ObjectMappingError => write!(f, "Object mapping error"),
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::DuplicateKey => write!(f, "Duplicate key"),
            ErrorKind::ImmutableField => write!(f, "Immutable field"),
            ErrorKind::BulkWriteError => write!(f, "Bulk write error"),
            ErrorKind::StoreClosed => write!(f, "Store closed"),
            ErrorKind::BackendError => write!(f, "Backend error"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Error type of every fallible operation in this crate.
///
/// `RepoError` carries a message, an [`ErrorKind`], an optional cause and the
/// backtrace captured where it was raised.
///
/// ```rust
/// use docrepo::errors::{ErrorKind, RepoError};
///
/// let cause = RepoError::new("connection reset", ErrorKind::BackendError);
/// let err = RepoError::new_with_cause("bulk write failed", ErrorKind::BulkWriteError, cause);
/// assert!(err.cause().is_some());
/// ```
#[derive(Clone)]
pub struct RepoError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<RepoError>>,
    backtrace: Arc<Backtrace>,
}

impl RepoError {
    /// Creates a new error with the given message and kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        RepoError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    /// Creates a new error that wraps `cause`.
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: RepoError) -> Self {
        RepoError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: Arc::new(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&RepoError> {
        self.cause.as_deref()
    }

    /// Shorthand for `self.kind().is_store_error()`.
    pub fn is_store_error(&self) -> bool {
        self.error_kind.is_store_error()
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.cause {
            Some(cause) => write!(f, "{} ({})\nCaused by: {:?}", self.message, self.error_kind, cause),
            None => write!(f, "{} ({})\n{:?}", self.message, self.error_kind, self.backtrace),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// Shorthand for `Result<T, RepoError>`.
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(feature = "serde")]
impl serde::de::Error for RepoError {
    fn custom<T: Display>(msg: T) -> Self {
        RepoError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

#[cfg(feature = "serde")]
impl serde::ser::Error for RepoError {
    fn custom<T: Display>(msg: T) -> Self {
        RepoError::new(&msg.to_string(), ErrorKind::ObjectMappingError)
    }
}

impl From<std::fmt::Error> for RepoError {
    fn from(err: std::fmt::Error) -> Self {
        RepoError::new(&format!("Formatting error: {}", err), ErrorKind::InternalError)
    }
}

impl From<tokio::task::JoinError> for RepoError {
    fn from(err: tokio::task::JoinError) -> Self {
        RepoError::new(&format!("Task failed: {}", err), ErrorKind::InternalError)
    }
}
