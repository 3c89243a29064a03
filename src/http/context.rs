//! Request context handed to handlers.
//!
//! # Responsibilities
//! - Split the request path into routing segments
//! - Keep the original request available to the terminal handler
//! - Hold the response the terminal handler produces
//!
//! # Design Decisions
//! - Empty segments are dropped: `/users//42/` routes as `["users", "42"]`
//! - Segments are not decoded or validated; indexed conversion does that

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};

/// Per-request state shared along the handler chain.
#[derive(Debug)]
pub struct RequestContext {
    request: Request<Body>,
    segments: Vec<String>,
    response: Option<Response>,
}

impl RequestContext {
    /// Build a context from an HTTP request, splitting its path.
    pub fn new(request: Request<Body>) -> Self {
        let segments = split_path(request.uri().path());
        Self {
            request,
            segments,
            response: None,
        }
    }

    /// Build a context from ready-made segments and an empty request.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            request: Request::default(),
            segments: segments.into_iter().map(Into::into).collect(),
            response: None,
        }
    }

    /// Ordered path segments to route over.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn request(&self) -> &Request<Body> {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request<Body> {
        &mut self.request
    }

    /// Store the response, replacing any earlier one.
    pub fn respond(&mut self, response: impl IntoResponse) {
        self.response = Some(response.into_response());
    }

    pub fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    pub fn into_parts(self) -> (Request<Body>, Option<Response>) {
        (self.request, self.response)
    }
}

/// Split a URI path into non-empty segments.
pub fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_owned)
        .collect()
}
