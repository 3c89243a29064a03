//! Route cache shared by every dispatch of one router.
//!
//! # Responsibilities
//! - Named table: `(handler type, segment)` to navigation function
//! - Indexed table: handler type to `IndexSlot`
//! - Set of handler types whose route tables were already walked
//!
//! # Design Decisions
//! - Write once per key: first insert wins, losers are dropped unobserved
//! - Entries are never mutated or removed
//! - Values are cloned out before returning; no guard escapes this module

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};

use crate::routing::handler::HandlerType;
use crate::routing::indexer::IndexSlot;
use crate::routing::routes::NavigationFn;

type NamedRoutes = DashMap<String, NavigationFn>;

/// Concurrent route tables.
#[derive(Default)]
pub struct RouteCache {
    named: DashMap<HandlerType, Arc<NamedRoutes>>,
    indexed: DashMap<HandlerType, IndexSlot>,
    discovered: DashSet<HandlerType>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Navigation function for `segment` on `handler`, if one was built.
    pub fn named_route(&self, handler: HandlerType, segment: &str) -> Option<NavigationFn> {
        let routes = self.named.get(&handler)?;
        let navigate = routes.get(segment)?;
        Some(Arc::clone(navigate.value()))
    }

    pub fn has_named_route(&self, handler: HandlerType, segment: &str) -> bool {
        self.named
            .get(&handler)
            .map(|routes| routes.contains_key(segment))
            .unwrap_or(false)
    }

    /// Insert a navigation function unless the key is already taken.
    ///
    /// Returns true if this call inserted it.
    pub fn insert_named_route(&self, handler: HandlerType, segment: &str, navigate: NavigationFn) -> bool {
        let routes = Arc::clone(self.named.entry(handler).or_default().value());
        let inserted = match routes.entry(segment.to_owned()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(vacant) => {
                vacant.insert(navigate);
                true
            }
        };
        inserted
    }

    /// Cached indexed slot of `handler`, if already built.
    pub fn index_slot(&self, handler: HandlerType) -> Option<IndexSlot> {
        self.indexed.get(&handler).map(|slot| slot.value().clone())
    }

    /// Insert a slot unless one exists; returns the slot that is now cached.
    pub fn insert_index_slot(&self, handler: HandlerType, slot: IndexSlot) -> IndexSlot {
        self.indexed.entry(handler).or_insert(slot).value().clone()
    }

    /// Record that `handler`'s route table was walked. True on first call.
    pub fn mark_discovered(&self, handler: HandlerType) -> bool {
        self.discovered.insert(handler)
    }

    pub fn is_discovered(&self, handler: HandlerType) -> bool {
        self.discovered.contains(&handler)
    }

    /// Total number of named routes across all handler types.
    pub fn named_route_count(&self) -> usize {
        self.named.iter().map(|routes| routes.len()).sum()
    }

    /// Number of handler types with a cached indexed slot.
    pub fn indexed_type_count(&self) -> usize {
        self.indexed.len()
    }

    pub fn discovered_type_count(&self) -> usize {
        self.discovered.len()
    }
}
