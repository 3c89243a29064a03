//! Routing error definitions.
//!
//! A routing miss is not an error: it is handed to the pass-through
//! continuation. Only configuration faults, conversion faults and the
//! terminal handler's own failures surface here.

use thiserror::Error;

/// Boxed error returned by handler business logic.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while dispatching a request.
#[derive(Debug, Error)]
pub enum RouteError {
    /// More than one indexed accessor is declared on a handler type.
    #[error("handler {handler} declares {count} indexed accessors, expected at most one")]
    AmbiguousIndexer { handler: &'static str, count: usize },

    /// A handler's route table was built for another handler type.
    #[error("handler {handler} returned a route table declared for {declared}")]
    MisdeclaredRoutes {
        handler: &'static str,
        declared: &'static str,
    },

    /// Generic string conversion failed for a parameter type without a fallible parser.
    #[error("cannot convert segment {segment:?} to {target}: {reason}")]
    Conversion {
        segment: String,
        target: &'static str,
        reason: String,
    },

    /// The terminal handler failed.
    #[error("handler failed: {0}")]
    Handler(#[source] BoxError),
}

impl RouteError {
    /// Wrap a handler failure.
    pub fn handler(err: impl Into<BoxError>) -> Self {
        RouteError::Handler(err.into())
    }

    /// True for faults caused by request input rather than configuration.
    pub fn is_conversion(&self) -> bool {
        matches!(self, RouteError::Conversion { .. })
    }
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;
