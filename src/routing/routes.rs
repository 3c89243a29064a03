//! Per-type route tables.
//!
//! A handler type declares its named children and its indexed accessor through
//! `Routes::builder`. The router reads these tables only while it builds its
//! caches; dispatch never touches them.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;

use crate::routing::convert::ConverterRegistry;
use crate::routing::handler::{downcast_ref, Handler, HandlerRef, HandlerType, IntoChild};
use crate::routing::indexer::{self, IndexInvoker};

/// Navigation from a handler to one of its named children.
pub type NavigationFn = Arc<dyn Fn(&dyn Handler) -> Option<HandlerRef> + Send + Sync>;

type BindFn = Box<dyn Fn(&ConverterRegistry) -> IndexInvoker + Send + Sync>;

struct NamedRoute {
    name: String,
    navigate: Option<NavigationFn>,
}

/// A declared indexed accessor, not yet bound to a converter.
pub struct IndexerSpec {
    param: &'static str,
    bind: BindFn,
}

impl IndexerSpec {
    /// Parameter type name, for diagnostics.
    pub fn param(&self) -> &'static str {
        self.param
    }

    /// Build the invoker, resolving the parameter conversion against `registry`.
    pub fn bind(&self, registry: &ConverterRegistry) -> IndexInvoker {
        (self.bind)(registry)
    }
}

/// Route table of one handler type.
#[derive(Default)]
pub struct Routes {
    owner: Option<HandlerType>,
    named: Vec<NamedRoute>,
    indexers: Vec<IndexerSpec>,
}

impl Routes {
    /// A table with no children: a leaf handler.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Start a table for handler type `H`.
    pub fn builder<H: Handler>() -> RoutesBuilder<H> {
        RoutesBuilder {
            routes: Routes {
                owner: Some(HandlerType::of::<H>()),
                ..Routes::empty()
            },
            _handler: PhantomData,
        }
    }

    /// Handler type the table was declared for. `None` for `Routes::empty()`.
    pub fn owner(&self) -> Option<HandlerType> {
        self.owner
    }

    /// True when the table was built for a type other than `handler`.
    pub fn is_declared_for_other(&self, handler: HandlerType) -> bool {
        self.owner.is_some_and(|owner| owner != handler)
    }

    /// Candidate child names, in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.named.iter().map(|route| route.name.as_str())
    }

    /// Build the navigation function for `name`.
    ///
    /// `None` when the name is unknown or was declared without an accessor.
    pub fn navigation(&self, name: &str) -> Option<NavigationFn> {
        self.named
            .iter()
            .find(|route| route.name == name)
            .and_then(|route| route.navigate.clone())
    }

    /// Every indexed accessor declared on the type.
    pub fn indexers(&self) -> &[IndexerSpec] {
        &self.indexers
    }

    pub fn is_leaf(&self) -> bool {
        self.named.is_empty() && self.indexers.is_empty()
    }

    fn push_named(&mut self, name: String, navigate: Option<NavigationFn>) {
        // First declaration of a name wins.
        if self.named.iter().any(|route| route.name == name) {
            tracing::warn!(name = %name, "Duplicate child route declaration ignored");
            return;
        }
        self.named.push(NamedRoute { name, navigate });
    }
}

impl fmt::Debug for Routes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Routes")
            .field("named", &self.names().collect::<Vec<_>>())
            .field(
                "indexers",
                &self.indexers.iter().map(|i| i.param).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Typed builder for a handler's route table.
pub struct RoutesBuilder<H> {
    routes: Routes,
    _handler: PhantomData<fn(&H)>,
}

impl<H: Handler> RoutesBuilder<H> {
    /// Declare a named child reachable by an exact segment match.
    pub fn child<F, R>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&H) -> R + Send + Sync + 'static,
        R: IntoChild,
    {
        let navigate: NavigationFn = Arc::new(move |handler: &dyn Handler| {
            downcast_ref::<H>(handler).and_then(|h| accessor(h).into_child())
        });
        self.routes.push_named(name.into(), Some(navigate));
        self
    }

    /// Reserve a child name without an accessor.
    ///
    /// The name is listed as a candidate but builds no route.
    pub fn reserve(mut self, name: impl Into<String>) -> Self {
        self.routes.push_named(name.into(), None);
        self
    }

    /// Declare a synchronous indexed accessor taking one parameter.
    pub fn indexer<P, F, R>(mut self, accessor: F) -> Self
    where
        P: FromStr + Send + 'static,
        P::Err: fmt::Display,
        F: Fn(&H, P) -> R + Send + Sync + 'static,
        R: IntoChild,
    {
        let accessor = Arc::new(accessor);
        self.routes.indexers.push(IndexerSpec {
            param: std::any::type_name::<P>(),
            bind: Box::new(move |registry: &ConverterRegistry| {
                indexer::bind_sync::<H, P, F, R>(accessor.clone(), registry)
            }),
        });
        self
    }

    /// Declare an asynchronous indexed accessor taking one parameter.
    pub fn indexer_async<P, F, Fut>(mut self, accessor: F) -> Self
    where
        P: FromStr + Send + 'static,
        P::Err: fmt::Display,
        F: Fn(Arc<H>, P) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoChild,
    {
        let accessor = Arc::new(accessor);
        self.routes.indexers.push(IndexerSpec {
            param: std::any::type_name::<P>(),
            bind: Box::new(move |registry: &ConverterRegistry| {
                indexer::bind_async::<H, P, F, Fut>(accessor.clone(), registry)
            }),
        });
        self
    }

    pub fn build(self) -> Routes {
        self.routes
    }
}

impl<H: Handler> From<RoutesBuilder<H>> for Routes {
    fn from(builder: RoutesBuilder<H>) -> Self {
        builder.build()
    }
}
