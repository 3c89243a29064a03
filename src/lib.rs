//! Handler-graph request routing for Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server ──▶ http::middleware ──▶ routing::ClassRouter
//!                                                              │
//!                            ┌─────────────────────────────────┤
//!                            ▼                                 ▼
//!                     named route table               indexed route table
//!                   (type, segment) → child        type → one indexed accessor
//!                            │                                 │
//!                            └──────────────┬──────────────────┘
//!                                           ▼
//!                               terminal Handler::handle
//!                                 or pass-through → 404
//!
//!     Cross-cutting: config, observability, lifecycle
//! ```

// Core subsystems
pub mod config;
pub mod http;
pub mod routing;

// Sample graph served by the binary
pub mod demo;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::{HttpServer, RequestContext};
pub use lifecycle::Shutdown;
pub use routing::{ClassRouter, Handler, HandlerRef, Next, RouteError, Routes};
