//! Indexed-route resolver builder.
//!
//! # Responsibilities
//! - Select the single indexed accessor of a handler type
//! - Bind it to the conversion chosen for its parameter type
//! - Produce a reusable, type-erased `IndexInvoker`
//!
//! # Design Decisions
//! - Zero accessors is cached as `IndexSlot::Missing`
//! - More than one accessor is a configuration fault, cached as `IndexSlot::Ambiguous`
//! - A table built for another type is a configuration fault, cached as `IndexSlot::Misdeclared`
//! - The conversion is chosen once per build, never per request

use std::fmt;
use std::future::{self, Future};
use std::str::FromStr;
use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::routing::convert::{ConversionKind, ConverterRegistry};
use crate::routing::handler::{downcast_arc, downcast_ref, Handler, HandlerRef, HandlerType, IntoChild};
use crate::routing::error::RouteResult;

/// Future returned by an invoker.
pub type InvokeFuture = BoxFuture<'static, RouteResult<Option<HandlerRef>>>;

type InvokeFn = dyn Fn(HandlerRef, &str) -> InvokeFuture + Send + Sync;

/// Converts a segment and calls a type's indexed accessor with it.
#[derive(Clone)]
pub struct IndexInvoker {
    handler: HandlerType,
    param: &'static str,
    conversion: ConversionKind,
    call: Arc<InvokeFn>,
}

impl IndexInvoker {
    /// Resolve `segment` against `handler`.
    ///
    /// `Ok(None)` is a routing miss. `Err` is a conversion fault.
    pub fn invoke(&self, handler: HandlerRef, segment: &str) -> InvokeFuture {
        (self.call)(handler, segment)
    }

    pub fn handler(&self) -> HandlerType {
        self.handler
    }

    pub fn param(&self) -> &'static str {
        self.param
    }

    pub fn conversion(&self) -> ConversionKind {
        self.conversion
    }
}

impl fmt::Debug for IndexInvoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexInvoker")
            .field("handler", &self.handler.name())
            .field("param", &self.param)
            .field("conversion", &self.conversion)
            .finish()
    }
}

/// Cached indexed-route state of one handler type.
#[derive(Debug, Clone)]
pub enum IndexSlot {
    /// The type declares no indexed accessor.
    Missing,
    Ready(Arc<IndexInvoker>),
    /// The type declares this many indexed accessors.
    Ambiguous(usize),
    /// The type's route table was built for the named type.
    Misdeclared(&'static str),
}

/// Inspect a handler's route table and build its indexed slot.
pub fn resolve(handler: &dyn Handler, registry: &ConverterRegistry) -> IndexSlot {
    let ty = HandlerType::of_val(handler);
    let routes = handler.routes();

    if let Some(declared) = routes.owner().filter(|owner| *owner != ty) {
        tracing::error!(
            handler = %ty,
            declared = %declared,
            "Route table declared for another handler type, routing through this handler will fail"
        );
        return IndexSlot::Misdeclared(declared.name());
    }

    match routes.indexers() {
        [] => {
            tracing::debug!(handler = %ty, "No indexed accessor");
            IndexSlot::Missing
        }
        [spec] => {
            let invoker = spec.bind(registry);
            tracing::debug!(
                handler = %ty,
                param = invoker.param(),
                conversion = %invoker.conversion(),
                "Indexed accessor bound"
            );
            IndexSlot::Ready(Arc::new(invoker))
        }
        specs => {
            tracing::error!(
                handler = %ty,
                count = specs.len(),
                params = ?specs.iter().map(|s| s.param()).collect::<Vec<_>>(),
                "Ambiguous indexed accessors, routing through this handler will fail"
            );
            IndexSlot::Ambiguous(specs.len())
        }
    }
}

pub(crate) fn bind_sync<H, P, F, R>(accessor: Arc<F>, registry: &ConverterRegistry) -> IndexInvoker
where
    H: Handler,
    P: FromStr + Send + 'static,
    P::Err: fmt::Display,
    F: Fn(&H, P) -> R + Send + Sync + 'static,
    R: IntoChild,
{
    let converter = registry.converter::<P>();

    let call = move |handler: HandlerRef, segment: &str| -> InvokeFuture {
        let result = converter.convert(segment).map(|param| {
            let param = param?;
            match downcast_ref::<H>(handler.as_ref()) {
                Some(h) => accessor(h, param).into_child(),
                None => {
                    tracing::debug!(expected = std::any::type_name::<H>(), "Indexed accessor applied to another handler type");
                    None
                }
            }
        });
        Box::pin(future::ready(result))
    };

    IndexInvoker {
        handler: HandlerType::of::<H>(),
        param: std::any::type_name::<P>(),
        conversion: converter.kind(),
        call: Arc::new(call),
    }
}

pub(crate) fn bind_async<H, P, F, Fut>(accessor: Arc<F>, registry: &ConverterRegistry) -> IndexInvoker
where
    H: Handler,
    P: FromStr + Send + 'static,
    P::Err: fmt::Display,
    F: Fn(Arc<H>, P) -> Fut + Send + Sync + 'static,
    Fut: Future + Send + 'static,
    Fut::Output: IntoChild,
{
    let converter = registry.converter::<P>();

    let call = move |handler: HandlerRef, segment: &str| -> InvokeFuture {
        let param = match converter.convert(segment) {
            Ok(Some(param)) => param,
            Ok(None) => return Box::pin(future::ready(Ok(None))),
            Err(err) => return Box::pin(future::ready(Err(err))),
        };
        let Some(handler) = downcast_arc::<H>(handler) else {
            tracing::debug!(expected = std::any::type_name::<H>(), "Indexed accessor applied to another handler type");
            return Box::pin(future::ready(Ok(None)));
        };
        let lookup = accessor(handler, param);
        Box::pin(async move { Ok(lookup.await.into_child()) })
    };

    IndexInvoker {
        handler: HandlerType::of::<H>(),
        param: std::any::type_name::<P>(),
        conversion: converter.kind(),
        call: Arc::new(call),
    }
}
