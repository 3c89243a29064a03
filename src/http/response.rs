//! Response mapping for routing faults.
//!
//! # Design Decisions
//! - Conversion faults come from request input: 400 Bad Request
//! - Ambiguous indexers and handler failures are server faults: 500
//! - Fault details are logged, not echoed to the client

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::routing::RouteError;

impl RouteError {
    /// HTTP status reported for this fault.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RouteError::Conversion { .. } => StatusCode::BAD_REQUEST,
            RouteError::AmbiguousIndexer { .. }
            | RouteError::MisdeclaredRoutes { .. }
            | RouteError::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            RouteError::Conversion { .. } => "Malformed path segment",
            RouteError::AmbiguousIndexer { .. } | RouteError::MisdeclaredRoutes { .. } => {
                "Route configuration error"
            }
            RouteError::Handler(_) => "Internal server error",
        };
        (status, body).into_response()
    }
}
