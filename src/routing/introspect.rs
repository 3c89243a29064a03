//! Handler graph introspection.
//!
//! Walks a handler graph from a starting instance and fills the named table
//! of a `RouteCache`. The walk uses an explicit work list; a `(type, name)`
//! pair already in the cache is never expanded again, which bounds the walk
//! and breaks cycles.

use std::sync::Arc;

use crate::routing::cache::RouteCache;
use crate::routing::handler::{HandlerRef, HandlerType};

/// Counters describing one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Discovery {
    /// Handler types seen for the first time.
    pub types: usize,
    /// Named routes inserted by this walk.
    pub inserted: usize,
    /// Candidates skipped because their key was already cached.
    pub skipped: usize,
    /// Candidates declared without an accessor.
    pub unresolved: usize,
    /// Routes inserted whose child was absent on the walked instance.
    pub absent: usize,
    /// Handlers whose route table was declared for another type.
    pub misdeclared: usize,
}

/// Populate `cache` with every named route reachable from `root`.
pub fn discover(cache: &RouteCache, root: &HandlerRef) -> Discovery {
    let mut stats = Discovery::default();
    let mut stack: Vec<HandlerRef> = vec![Arc::clone(root)];

    while let Some(current) = stack.pop() {
        let ty = HandlerType::of_val(current.as_ref());
        if cache.mark_discovered(ty) {
            stats.types += 1;
        }

        let routes = current.routes();
        if let Some(declared) = routes.owner().filter(|owner| *owner != ty) {
            tracing::error!(
                handler = %ty,
                declared = %declared,
                "Route table declared for another handler type, children not cached"
            );
            stats.misdeclared += 1;
            continue;
        }

        for name in routes.names() {
            if cache.has_named_route(ty, name) {
                stats.skipped += 1;
                continue;
            }

            let Some(navigate) = routes.navigation(name) else {
                tracing::debug!(handler = %ty, name, "Child declared without accessor, skipped");
                stats.unresolved += 1;
                continue;
            };

            if !cache.insert_named_route(ty, name, Arc::clone(&navigate)) {
                stats.skipped += 1;
                continue;
            }
            stats.inserted += 1;
            tracing::trace!(handler = %ty, name, "Named route cached");

            match navigate(current.as_ref()) {
                Some(child) => stack.push(child),
                None => {
                    tracing::debug!(handler = %ty, name, "Child absent at discovery, not expanded");
                    stats.absent += 1;
                }
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::handler::Handler;
    use crate::routing::routes::Routes;
    use std::sync::{OnceLock, Weak};

    struct Leaf;
    impl Handler for Leaf {}

    struct Branch {
        left: Arc<Leaf>,
        right: Arc<Leaf>,
    }

    impl Handler for Branch {
        fn routes(&self) -> Routes {
            Routes::builder::<Self>()
                .child("left", |b| b.left.clone())
                .child("right", |b| b.right.clone())
                .reserve("pending")
                .child("gone", |_| None::<Arc<Leaf>>)
                .build()
        }
    }

    struct Tree {
        a: Arc<Branch>,
        b: Arc<Branch>,
    }

    impl Handler for Tree {
        fn routes(&self) -> Routes {
            Routes::builder::<Self>()
                .child("a", |t| t.a.clone())
                .child("b", |t| t.b.clone())
                .build()
        }
    }

    // A -> B -> A through a weak back edge.
    struct CycleA {
        b: Arc<CycleB>,
    }

    struct CycleB {
        a: OnceLock<Weak<CycleA>>,
    }

    impl Handler for CycleA {
        fn routes(&self) -> Routes {
            Routes::builder::<Self>().child("b", |a| a.b.clone()).build()
        }
    }

    impl Handler for CycleB {
        fn routes(&self) -> Routes {
            Routes::builder::<Self>()
                .child("a", |b| b.a.get().and_then(Weak::upgrade))
                .build()
        }
    }

    // Builds its table as if it were a Tree.
    struct Impostor {
        leaf: Arc<Leaf>,
    }

    impl Handler for Impostor {
        fn routes(&self) -> Routes {
            let leaf = self.leaf.clone();
            Routes::builder::<Tree>().child("leaf", move |_| leaf.clone()).build()
        }
    }

    fn branch() -> Arc<Branch> {
        Arc::new(Branch {
            left: Arc::new(Leaf),
            right: Arc::new(Leaf),
        })
    }

    #[test]
    fn test_leaf_root() {
        let cache = RouteCache::new();
        let root: HandlerRef = Arc::new(Leaf);
        let stats = discover(&cache, &root);
        assert_eq!(stats.types, 1);
        assert_eq!(stats.inserted, 0);
        assert_eq!(cache.named_route_count(), 0);
        assert!(cache.is_discovered(HandlerType::of::<Leaf>()));
    }

    #[test]
    fn test_one_entry_per_reachable_pair() {
        let cache = RouteCache::new();
        let root: HandlerRef = Arc::new(Tree { a: branch(), b: branch() });
        let stats = discover(&cache, &root);

        // Tree.a, Tree.b, Branch.left, Branch.right, Branch.gone
        assert_eq!(cache.named_route_count(), 5);
        assert_eq!(stats.inserted, 5);
        assert_eq!(stats.types, 3);
        // The second Branch instance finds all of its keys cached.
        assert_eq!(stats.skipped, 3);
        // "pending" is reported once per Branch instance.
        assert_eq!(stats.unresolved, 2);
        assert_eq!(stats.absent, 1);

        let branch_ty = HandlerType::of::<Branch>();
        assert!(cache.has_named_route(branch_ty, "gone"));
        assert!(!cache.has_named_route(branch_ty, "pending"));
    }

    #[test]
    fn test_second_walk_inserts_nothing() {
        let cache = RouteCache::new();
        let root: HandlerRef = Arc::new(Tree { a: branch(), b: branch() });
        discover(&cache, &root);
        let again = discover(&cache, &root);
        assert_eq!(again.inserted, 0);
        assert_eq!(again.types, 0);
        assert_eq!(cache.named_route_count(), 5);
    }

    #[test]
    fn test_cycle_terminates() {
        let b = Arc::new(CycleB { a: OnceLock::new() });
        let a = Arc::new(CycleA { b: b.clone() });
        b.a.set(Arc::downgrade(&a)).ok();

        let cache = RouteCache::new();
        let root: HandlerRef = a;
        let stats = discover(&cache, &root);

        assert_eq!(cache.named_route_count(), 2);
        assert_eq!(stats.inserted, 2);
        // The walk revisits CycleA once and stops on its cached "b".
        assert_eq!(stats.skipped, 1);
    }

    #[test]
    fn test_table_for_another_type_is_not_cached() {
        let cache = RouteCache::new();
        let root: HandlerRef = Arc::new(Impostor { leaf: Arc::new(Leaf) });
        let stats = discover(&cache, &root);

        assert_eq!(stats.misdeclared, 1);
        assert_eq!(stats.inserted, 0);
        assert_eq!(cache.named_route_count(), 0);
        assert!(cache.is_discovered(HandlerType::of::<Impostor>()));
    }
}
