//! Error types used by destinations.
//!
//! [`DestinationError`] is the only error type in the crate. It never reaches
//! callers of [`Walker::push`](crate::Walker::push): the registry contains every
//! destination failure at the point of delivery.
//!
//! It provides helper methods (`as_label`, `as_message`) for logging.

use thiserror::Error;

/// # Errors produced by a destination.
///
/// Returned from [`Destination::init`](crate::Destination::init) and
/// [`Destination::push`](crate::Destination::push), or synthesized by the
/// registry when a destination panics.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DestinationError {
    /// Delivery or initialization failed.
    #[error("destination failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Destination panicked; the panic was caught by the registry.
    #[error("destination panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Destination is not ready to accept events yet.
    #[error("destination not ready")]
    NotReady,
}

impl DestinationError {
    /// Creates a [`DestinationError::Fail`] from any displayable error.
    pub fn fail(error: impl std::fmt::Display) -> Self {
        DestinationError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use walkerbus::DestinationError;
    ///
    /// let err = DestinationError::fail("connection refused");
    /// assert_eq!(err.as_label(), "destination_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DestinationError::Fail { .. } => "destination_failed",
            DestinationError::Panicked { .. } => "destination_panicked",
            DestinationError::NotReady => "destination_not_ready",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            DestinationError::Fail { error } => format!("error: {error}"),
            DestinationError::Panicked { info } => format!("panic: {info}"),
            DestinationError::NotReady => "not ready".to_string(),
        }
    }

    /// Builds a [`DestinationError::Panicked`] from a `catch_unwind` payload.
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let info = if let Some(msg) = payload.downcast_ref::<&'static str>() {
            (*msg).to_string()
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.clone()
        } else {
            "unknown panic".to_string()
        };
        DestinationError::Panicked { info }
    }
}
