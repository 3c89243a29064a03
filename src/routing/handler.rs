//! The handler capability and the values that flow between handlers.
//!
//! # Responsibilities
//! - Define the object-safe `Handler` trait every routable type implements
//! - Identify concrete handler types at runtime (`HandlerType`)
//! - Model the pass-through continuation (`Next`)
//!
//! # Design Decisions
//! - Handlers are shared as `Arc<dyn Handler>`; the router never owns the graph
//! - Type identity comes from `TypeId` of the concrete value, never of `dyn Handler`
//! - `Next` is a lazy future: running it is invoking the continuation

use std::any::{Any, TypeId};
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;

use crate::http::context::RequestContext;
use crate::routing::error::RouteResult;
use crate::routing::routes::Routes;

/// Shared handle to a handler instance.
pub type HandlerRef = Arc<dyn Handler>;

/// Upcasting helpers implemented for every concrete handler type.
pub trait AsAny: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

/// A request handler that may expose named or indexed children.
#[async_trait]
pub trait Handler: AsAny {
    /// Process the request. Handlers that cannot answer run `next`.
    async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> RouteResult<()> {
        let _ = ctx;
        next.run().await;
        Ok(())
    }

    /// Route table for this type. Consulted only while the router builds its caches.
    fn routes(&self) -> Routes {
        Routes::empty()
    }
}

/// Runtime identity of a concrete handler type.
#[derive(Debug, Clone, Copy)]
pub struct HandlerType {
    id: TypeId,
    name: &'static str,
}

impl HandlerType {
    pub fn of<H: Handler>() -> Self {
        Self {
            id: TypeId::of::<H>(),
            name: std::any::type_name::<H>(),
        }
    }

    /// Identity of the concrete type behind a trait object.
    pub fn of_val(handler: &dyn Handler) -> Self {
        Self {
            id: AsAny::as_any(handler).type_id(),
            name: AsAny::type_name(handler),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for HandlerType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for HandlerType {}

impl Hash for HandlerType {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.id.hash(state);
    }
}

impl fmt::Display for HandlerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Borrow the concrete handler behind a trait object.
pub fn downcast_ref<H: Handler>(handler: &dyn Handler) -> Option<&H> {
    AsAny::as_any(handler).downcast_ref::<H>()
}

/// Recover the concrete `Arc` behind a shared handler.
pub fn downcast_arc<H: Handler>(handler: HandlerRef) -> Option<Arc<H>> {
    AsAny::into_any(handler).downcast::<H>().ok()
}

/// The pass-through continuation.
///
/// Wraps a lazily started future; dropping it without calling `run` means the
/// continuation was never invoked.
pub struct Next<'a> {
    inner: BoxFuture<'a, ()>,
}

impl<'a> Next<'a> {
    pub fn new<F>(fut: F) -> Self
    where
        F: Future<Output = ()> + Send + 'a,
    {
        Self {
            inner: Box::pin(fut),
        }
    }

    /// A continuation that does nothing.
    pub fn noop() -> Self {
        Self::new(async {})
    }

    /// Hand control back to the surrounding middleware chain.
    pub async fn run(self) {
        self.inner.await
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Values an accessor may return as a child handler.
pub trait IntoChild {
    fn into_child(self) -> Option<HandlerRef>;
}

impl<C: Handler> IntoChild for Arc<C> {
    fn into_child(self) -> Option<HandlerRef> {
        Some(self)
    }
}

impl<C: Handler> IntoChild for Option<Arc<C>> {
    fn into_child(self) -> Option<HandlerRef> {
        self.map(|child| child as HandlerRef)
    }
}

impl IntoChild for HandlerRef {
    fn into_child(self) -> Option<HandlerRef> {
        Some(self)
    }
}

impl IntoChild for Option<HandlerRef> {
    fn into_child(self) -> Option<HandlerRef> {
        self
    }
}
