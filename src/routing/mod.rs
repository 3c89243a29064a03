//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Router construction (once):
//!     root handler
//!     → introspect.rs (walk route tables with a work list)
//!     → cache.rs (named table: (type, segment) → navigation fn)
//!
//! Incoming request (segments):
//!     → router.rs (segment loop, starting at the root)
//!     → cache.rs named table hit → next handler
//!     → miss → indexer.rs (bind the type's indexed accessor, once per type)
//!              → convert.rs (try-parse or generic conversion)
//!     → terminal handler, or pass-through continuation on any miss
//! ```
//!
//! # Design Decisions
//! - Route tables are declared per type (routes.rs), not discovered by reflection
//! - Caches are write-once per key and owned by one router
//! - No wildcard or regex patterns: exact names and one indexed accessor per type
//! - Routing misses are not errors

pub mod cache;
pub mod convert;
pub mod error;
pub mod handler;
pub mod indexer;
pub mod introspect;
pub mod router;
pub mod routes;

pub use convert::{ConversionKind, ConverterRegistry};
pub use error::{BoxError, RouteError, RouteResult};
pub use handler::{Handler, HandlerRef, HandlerType, IntoChild, Next};
pub use indexer::{IndexInvoker, IndexSlot};
pub use introspect::Discovery;
pub use router::{ClassRouter, ClassRouterBuilder, ConversionFaultPolicy, Dispatch};
pub use routes::{NavigationFn, Routes, RoutesBuilder};
