//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Own the route cache and converter registry of one handler graph
//! - Walk a request's segments from the root handler
//! - Invoke the terminal handler, or the pass-through continuation on a miss
//!
//! # Design Decisions
//! - Named routes are built at construction; indexed slots on first use per type
//! - Segments are resolved strictly in order, once each
//! - A miss is never an error; configuration and conversion faults are

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::RoutingConfig;
use crate::http::context::RequestContext;
use crate::observability::metrics;
use crate::routing::cache::RouteCache;
use crate::routing::convert::{ConverterRegistry, TryParseFn};
use crate::routing::error::{RouteError, RouteResult};
use crate::routing::handler::{HandlerRef, HandlerType, Next};
use crate::routing::indexer::{self, IndexSlot};
use crate::routing::introspect::{self, Discovery};

/// What to do when generic segment conversion fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionFaultPolicy {
    /// Return `RouteError::Conversion` from dispatch.
    #[default]
    Propagate,
    /// Treat the fault as a routing miss.
    PassThrough,
}

/// How a dispatch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The terminal handler was invoked.
    Handled,
    /// Routing stopped early and the pass-through continuation ran.
    PassedThrough,
}

impl Dispatch {
    fn as_label(self) -> &'static str {
        match self {
            Dispatch::Handled => "handled",
            Dispatch::PassedThrough => "passed_through",
        }
    }
}

/// Builder for `ClassRouter`.
pub struct ClassRouterBuilder {
    root: HandlerRef,
    converters: ConverterRegistry,
    conversion_faults: ConversionFaultPolicy,
    eager: bool,
}

impl ClassRouterBuilder {
    /// Register a fallible parser for indexed parameters of type `P`.
    pub fn converter<P: 'static>(mut self, parse: TryParseFn<P>) -> Self {
        self.converters.register(parse);
        self
    }

    /// Replace the converter registry.
    pub fn converters(mut self, registry: ConverterRegistry) -> Self {
        self.converters = registry;
        self
    }

    pub fn conversion_faults(mut self, policy: ConversionFaultPolicy) -> Self {
        self.conversion_faults = policy;
        self
    }

    /// Walk the root graph at construction (default) or on the first request.
    pub fn eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    /// Apply the `[routing]` configuration section.
    pub fn config(self, config: &RoutingConfig) -> Self {
        self.conversion_faults(config.conversion_faults)
            .eager(config.eager_discovery)
    }

    pub fn build(self) -> ClassRouter {
        let router = ClassRouter {
            root: self.root,
            cache: RouteCache::new(),
            converters: self.converters,
            conversion_faults: self.conversion_faults,
        };
        if self.eager {
            router.initialize();
        }
        router
    }
}

/// Routes requests through a handler graph.
pub struct ClassRouter {
    root: HandlerRef,
    cache: RouteCache,
    converters: ConverterRegistry,
    conversion_faults: ConversionFaultPolicy,
}

impl ClassRouter {
    /// Create a router with default converters and eager discovery.
    pub fn new(root: HandlerRef) -> Self {
        Self::builder(root).build()
    }

    pub fn builder(root: HandlerRef) -> ClassRouterBuilder {
        ClassRouterBuilder {
            root,
            converters: ConverterRegistry::with_defaults(),
            conversion_faults: ConversionFaultPolicy::default(),
            eager: true,
        }
    }

    /// Walk the graph from the root and cache every reachable named route.
    pub fn initialize(&self) -> Discovery {
        let stats = self.discover(&self.root);
        tracing::info!(
            root = %HandlerType::of_val(self.root.as_ref()),
            types = stats.types,
            named_routes = self.cache.named_route_count(),
            "Handler graph discovered"
        );
        stats
    }

    fn discover(&self, handler: &HandlerRef) -> Discovery {
        let stats = introspect::discover(&self.cache, handler);
        if stats.inserted > 0 {
            metrics::record_route_cache(self.cache.named_route_count(), self.cache.indexed_type_count());
        }
        stats
    }

    /// Walk `handler` unless its type was walked before.
    fn ensure_discovered(&self, handler: &HandlerRef) {
        let ty = HandlerType::of_val(handler.as_ref());
        if !self.cache.is_discovered(ty) {
            let stats = self.discover(handler);
            tracing::debug!(handler = %ty, inserted = stats.inserted, "Late discovery");
        }
    }

    /// Route the request in `ctx`.
    ///
    /// Runs the terminal handler with `next`, or runs `next` itself when a
    /// segment cannot be resolved.
    pub async fn handle(&self, ctx: &mut RequestContext, next: Next<'_>) -> RouteResult<Dispatch> {
        let started = Instant::now();
        let result = self.dispatch(ctx, next).await;
        let outcome = match &result {
            Ok(dispatch) => dispatch.as_label(),
            Err(RouteError::Conversion { .. }) => "conversion_fault",
            Err(RouteError::AmbiguousIndexer { .. }) => "ambiguous_indexer",
            Err(RouteError::MisdeclaredRoutes { .. }) => "misdeclared_routes",
            Err(RouteError::Handler(_)) => "handler_error",
        };
        metrics::record_dispatch(outcome, started);
        result
    }

    async fn dispatch(&self, ctx: &mut RequestContext, next: Next<'_>) -> RouteResult<Dispatch> {
        let mut current = Arc::clone(&self.root);
        self.ensure_discovered(&current);

        for segment in ctx.segments() {
            let ty = HandlerType::of_val(current.as_ref());

            let resolved = match self.cache.named_route(ty, segment) {
                Some(navigate) => navigate(current.as_ref()),
                None => self.resolve_indexed(ty, &current, segment).await?,
            };

            match resolved {
                Some(child) => {
                    tracing::trace!(handler = %ty, segment = %segment, "Segment resolved");
                    current = child;
                    self.ensure_discovered(&current);
                }
                None => {
                    tracing::debug!(handler = %ty, segment = %segment, "Routing miss, passing through");
                    next.run().await;
                    return Ok(Dispatch::PassedThrough);
                }
            }
        }

        current.handle(ctx, next).await?;
        Ok(Dispatch::Handled)
    }

    async fn resolve_indexed(
        &self,
        ty: HandlerType,
        current: &HandlerRef,
        segment: &str,
    ) -> RouteResult<Option<HandlerRef>> {
        let invoker = match self.index_slot(ty, current) {
            IndexSlot::Missing => return Ok(None),
            IndexSlot::Ambiguous(count) => {
                return Err(RouteError::AmbiguousIndexer {
                    handler: ty.name(),
                    count,
                })
            }
            IndexSlot::Misdeclared(declared) => {
                return Err(RouteError::MisdeclaredRoutes {
                    handler: ty.name(),
                    declared,
                })
            }
            IndexSlot::Ready(invoker) => invoker,
        };

        match invoker.invoke(Arc::clone(current), segment).await {
            Err(err) if err.is_conversion() && self.conversion_faults == ConversionFaultPolicy::PassThrough => {
                tracing::debug!(handler = %ty, error = %err, "Conversion fault treated as routing miss");
                Ok(None)
            }
            result => result,
        }
    }

    fn index_slot(&self, ty: HandlerType, current: &HandlerRef) -> IndexSlot {
        if let Some(slot) = self.cache.index_slot(ty) {
            return slot;
        }
        let slot = self.cache.insert_index_slot(ty, indexer::resolve(current.as_ref(), &self.converters));
        metrics::record_route_cache(self.cache.named_route_count(), self.cache.indexed_type_count());
        slot
    }

    pub fn root(&self) -> &HandlerRef {
        &self.root
    }

    pub fn conversion_fault_policy(&self) -> ConversionFaultPolicy {
        self.conversion_faults
    }

    pub fn named_route_count(&self) -> usize {
        self.cache.named_route_count()
    }

    pub fn indexed_type_count(&self) -> usize {
        self.cache.indexed_type_count()
    }

    pub fn has_named_route(&self, handler: HandlerType, segment: &str) -> bool {
        self.cache.has_named_route(handler, segment)
    }

    /// Cached indexed slot of `handler`, without building it.
    pub fn indexed_slot(&self, handler: HandlerType) -> Option<IndexSlot> {
        self.cache.index_slot(handler)
    }
}
