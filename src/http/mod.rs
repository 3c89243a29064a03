//! HTTP embedding of the routing core.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace and timeout layers)
//!     → middleware.rs (build RequestContext, run ClassRouter)
//!     → context.rs (segments, request, response slot)
//!     → terminal handler response, or inner service on pass-through
//!     → response.rs (routing faults mapped to status codes)
//! ```

pub mod context;
pub mod middleware;
pub mod response;
pub mod server;

pub use context::RequestContext;
pub use middleware::class_router_middleware;
pub use server::HttpServer;
