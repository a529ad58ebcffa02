//! Error types for the dic dependency injection container.
//!
//! This module defines a lightweight error model used across the container to
//! describe failures that can occur during type registration and resolution.
//!
//! # Design
//!
//! - `ErrorKind` captures the error category.
//! - `Error` stores the category and a human-readable message.
//!
//! The helpers in `Error` keep call sites concise and error messages consistent.
//!
//! # Feature Flags
//!
//! - `tracing`: logs errors when they are created.
//! - `debug`: enables extra diagnostic formatting in `Display`.
//!
//! # Examples
//!
//! ```
//! use dic::error::{Error, ErrorKind};
//!
//! let err = Error::type_not_found("app::Mailer");
//! assert!(err.kind == ErrorKind::TypeNotFound);
//! assert!(err.message.contains("app::Mailer"));
//! ```

use core::fmt;

#[cfg(feature = "tracing")]
use tracing::{error, warn};

/// Error categories for the container.
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub enum ErrorKind {
    /// The identifier does not name a known, constructible type.
    TypeNotFound,
    /// A collaborator was handed an empty type identifier.
    InvalidArgument,
    /// A type depends on itself, directly or transitively.
    CircularDependency,
    /// An instance does not hold the type it was expected to hold.
    TypeMismatch,
    /// A constructor asked for an argument that resolved to nothing.
    MissingArgument,
    /// A descriptor for this type identifier is already registered.
    TypeAlreadyRegistered,
    /// The process-wide container was created before it could be installed.
    SharedAlreadyInitialized,
    /// A weak handle outlived the container it points at.
    ContainerDropped,
}

/// Container error structure.
///
/// `kind` enables programmatic handling, while `message` is human-readable.
#[derive(Clone)]
#[cfg_attr(feature = "debug", derive(Debug))]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

impl Error {
    /// Creates a new error with the given kind and message.
    ///
    /// If the `tracing` feature is enabled, the error is automatically logged.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let error = Self {
            kind,
            message: message.into(),
        };

        #[cfg(feature = "tracing")]
        {
            if matches!(
                kind,
                ErrorKind::TypeAlreadyRegistered | ErrorKind::SharedAlreadyInitialized
            ) {
                warn!("{}", error);
            } else {
                error!("{}", error);
            }
        }

        error
    }

    /// The identifier names no registered type, or one without a constructor.
    pub fn type_not_found(type_id: &str) -> Self {
        Self::new(
            ErrorKind::TypeNotFound,
            format!("Type \"{}\" does not exist", type_id),
        )
    }

    /// An empty type identifier reached an operation that requires one.
    pub fn invalid_argument(operation: &str) -> Self {
        Self::new(
            ErrorKind::InvalidArgument,
            format!("Type identifier can not be empty ({})", operation),
        )
    }

    /// Circular dependency detected in resolution chain.
    pub fn circular_dependency(dependency_chain: &[&str]) -> Self {
        Self::new(
            ErrorKind::CircularDependency,
            format!(
                "Circular dependency detected: {}",
                dependency_chain.join(" -> ")
            ),
        )
    }

    /// An instance could not be downcast to the requested type.
    pub fn type_mismatch(expected: &str, context: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("Expected an instance of {} while resolving {}", expected, context),
        )
    }

    /// Argument `position` of `type_id` resolved to nothing, or was never supplied.
    pub fn missing_argument(type_id: &str, position: usize) -> Self {
        Self::new(
            ErrorKind::MissingArgument,
            format!(
                "Argument #{} of {} resolved to nothing",
                position, type_id
            ),
        )
    }

    /// A descriptor was registered twice for the same identifier.
    pub fn type_already_registered(type_id: &str) -> Self {
        Self::new(
            ErrorKind::TypeAlreadyRegistered,
            format!("Type already registered: {}", type_id),
        )
    }

    /// The shared container exists already and can no longer be replaced.
    pub fn shared_already_initialized() -> Self {
        Self::new(
            ErrorKind::SharedAlreadyInitialized,
            "The shared container has already been initialized",
        )
    }

    /// A weak container handle could not be upgraded.
    pub fn container_dropped() -> Self {
        Self::new(
            ErrorKind::ContainerDropped,
            "The container behind this handle has been dropped",
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        #[cfg(feature = "debug")]
        {
            write!(f, "({:?}) - {}", self.kind, self.message)
        }
        #[cfg(not(feature = "debug"))]
        {
            write!(f, "{}", self.message)
        }
    }
}

#[cfg(feature = "debug")]
impl std::error::Error for Error {}
