//! Axum middleware that runs a `ClassRouter` in front of the inner service.
//!
//! The router's pass-through continuation maps onto axum's `Next`: when the
//! router defers, or the terminal handler leaves no response, the request is
//! forwarded unchanged to the rest of the stack.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::http::context::RequestContext;
use crate::routing::{self, ClassRouter};

/// Route the request through the handler graph, deferring to `next` on a miss.
pub async fn class_router_middleware(
    State(router): State<Arc<ClassRouter>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let mut ctx = RequestContext::new(request);

    let deferred = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&deferred);
    let pass_through = routing::Next::new(async move {
        flag.store(true, Ordering::Release);
    });

    if let Err(err) = router.handle(&mut ctx, pass_through).await {
        if err.is_conversion() {
            tracing::warn!(path = %path, error = %err, "Rejected request");
        } else {
            tracing::error!(path = %path, error = %err, "Routing failed");
        }
        return err.into_response();
    }

    let (request, response) = ctx.into_parts();
    match response {
        Some(response) if !deferred.load(Ordering::Acquire) => response,
        _ => {
            tracing::trace!(path = %path, "Forwarding to inner service");
            next.run(request).await
        }
    }
}
