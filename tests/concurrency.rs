//! Concurrent first-time resolution against one router.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use handler_router::routing::{ClassRouter, Dispatch, HandlerType, IndexSlot, Next};
use handler_router::RequestContext;

mod common;

use common::Users;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_builds_one_entry_per_key() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Arc::new(ClassRouter::builder(common::shop(&hits)).eager(false).build());

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let id = [1, 2, 123][i % 3].to_string();
                let mut ctx = RequestContext::from_segments(["Users".to_string(), id, "Profile".to_string()]);
                router.handle(&mut ctx, Next::noop()).await
            })
        })
        .collect();

    for task in tasks {
        assert_eq!(task.await.unwrap().unwrap(), Dispatch::Handled);
    }

    assert_eq!(router.named_route_count(), common::SHOP_NAMED_ROUTES + 1);
    // Only Users was ever asked for an indexed child.
    assert_eq!(router.indexed_type_count(), 1);
    assert!(matches!(
        router.indexed_slot(HandlerType::of::<Users>()),
        Some(IndexSlot::Ready(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_outcomes() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Arc::new(ClassRouter::new(common::shop(&hits)));

    let tasks: Vec<_> = (0..48)
        .map(|i| {
            let router = router.clone();
            tokio::spawn(async move {
                let path: &[&str] = match i % 3 {
                    0 => &["Users", "123"],
                    1 => &["Users", "abc"],
                    _ => &["Orders"],
                };
                let mut ctx = RequestContext::from_segments(path.iter().copied());
                (i % 3, router.handle(&mut ctx, Next::noop()).await.unwrap())
            })
        })
        .collect();

    for task in tasks {
        let (kind, outcome) = task.await.unwrap();
        let expected = if kind == 0 {
            Dispatch::Handled
        } else {
            Dispatch::PassedThrough
        };
        assert_eq!(outcome, expected);
    }
    assert_eq!(hits.load(Ordering::SeqCst), 16);
}
