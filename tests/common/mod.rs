//! Shared handler graphs for integration tests.
//!
//! ```text
//! Shop
//!  ├─ Users ── {u64} ── User ── Profile
//!  ├─ Registry ── {u64 | String}      (two indexers)
//!  ├─ Skus ── {Sku} ── SkuItem        (Sku has no registered parser)
//!  ├─ Broken                          (handler fails)
//!  └─ Archive                         (reserved, no accessor)
//! ```

#![allow(dead_code)]

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use async_trait::async_trait;
use handler_router::routing::{Handler, HandlerRef, Next, RouteError, RouteResult, Routes};
use handler_router::RequestContext;

pub struct Profile {
    pub owner: u64,
}

#[async_trait]
impl Handler for Profile {
    async fn handle(&self, ctx: &mut RequestContext, _next: Next<'_>) -> RouteResult<()> {
        ctx.respond(format!("profile {}", self.owner));
        Ok(())
    }
}

pub struct User {
    pub id: u64,
    profile: Arc<Profile>,
    hits: Arc<AtomicUsize>,
}

#[async_trait]
impl Handler for User {
    async fn handle(&self, ctx: &mut RequestContext, _next: Next<'_>) -> RouteResult<()> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        ctx.respond(format!("user {}", self.id));
        Ok(())
    }

    fn routes(&self) -> Routes {
        Routes::builder::<Self>()
            .child("Profile", |user| user.profile.clone())
            .build()
    }
}

pub struct Users {
    users: HashMap<u64, Arc<User>>,
}

impl Handler for Users {
    fn routes(&self) -> Routes {
        Routes::builder::<Self>()
            .indexer(|users, id: u64| users.users.get(&id).cloned())
            .build()
    }
}

pub struct Ambiguous;

impl Handler for Ambiguous {
    fn routes(&self) -> Routes {
        Routes::builder::<Self>()
            .indexer(|_, id: u64| Arc::new(Profile { owner: id }))
            .indexer(|_, name: String| Arc::new(Profile { owner: name.len() as u64 }))
            .build()
    }
}

/// Stock keeping unit, written `SKU-<code>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sku(pub String);

impl FromStr for Sku {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("SKU-")
            .filter(|code| !code.is_empty())
            .map(|code| Sku(code.to_string()))
            .ok_or_else(|| format!("{s:?} is not a SKU"))
    }
}

pub struct SkuItem {
    pub sku: Sku,
}

#[async_trait]
impl Handler for SkuItem {
    async fn handle(&self, ctx: &mut RequestContext, _next: Next<'_>) -> RouteResult<()> {
        ctx.respond(format!("sku {}", self.sku.0));
        Ok(())
    }
}

pub struct SkuCatalog;

impl Handler for SkuCatalog {
    fn routes(&self) -> Routes {
        Routes::builder::<Self>()
            .indexer(|_, sku: Sku| Arc::new(SkuItem { sku }))
            .build()
    }
}

pub struct Broken;

#[async_trait]
impl Handler for Broken {
    async fn handle(&self, _ctx: &mut RequestContext, _next: Next<'_>) -> RouteResult<()> {
        Err(RouteError::handler("storage unavailable"))
    }
}

pub struct Shop {
    users: Arc<Users>,
    registry: Arc<Ambiguous>,
    skus: Arc<SkuCatalog>,
    broken: Arc<Broken>,
}

impl Handler for Shop {
    fn routes(&self) -> Routes {
        Routes::builder::<Self>()
            .child("Users", |shop| shop.users.clone())
            .child("Registry", |shop| shop.registry.clone())
            .child("Skus", |shop| shop.skus.clone())
            .child("Broken", |shop| shop.broken.clone())
            .reserve("Archive")
            .build()
    }
}

/// Named routes the start-up walk of `shop` finds.
pub const SHOP_NAMED_ROUTES: usize = 4;

/// The `Shop` graph with users 1, 2 and 123. `hits` counts `User::handle` calls.
pub fn shop(hits: &Arc<AtomicUsize>) -> HandlerRef {
    let users = [1, 2, 123]
        .into_iter()
        .map(|id| {
            let user = Arc::new(User {
                id,
                profile: Arc::new(Profile { owner: id }),
                hits: hits.clone(),
            });
            (id, user)
        })
        .collect();

    Arc::new(Shop {
        users: Arc::new(Users { users }),
        registry: Arc::new(Ambiguous),
        skus: Arc::new(SkuCatalog),
        broken: Arc::new(Broken),
    })
}

/// Root whose route table is declared for `Shop` instead of itself.
pub struct Mislabeled {
    profile: Arc<Profile>,
}

impl Handler for Mislabeled {
    fn routes(&self) -> Routes {
        let profile = self.profile.clone();
        Routes::builder::<Shop>()
            .child("leaf", move |_| profile.clone())
            .indexer(|_, owner: u32| Arc::new(Profile { owner: owner.into() }))
            .build()
    }
}

pub fn mislabeled() -> HandlerRef {
    Arc::new(Mislabeled {
        profile: Arc::new(Profile { owner: 0 }),
    })
}

/// A ring node whose `next` points back into the ring.
pub struct Node {
    pub label: &'static str,
    next: OnceLock<Weak<Node>>,
}

#[async_trait]
impl Handler for Node {
    async fn handle(&self, ctx: &mut RequestContext, _next: Next<'_>) -> RouteResult<()> {
        ctx.respond(self.label);
        Ok(())
    }

    fn routes(&self) -> Routes {
        Routes::builder::<Self>()
            .child("next", |node| node.next.get().and_then(Weak::upgrade))
            .build()
    }
}

/// Two nodes pointing at each other. Both must be kept alive by the caller.
pub fn ring() -> (Arc<Node>, Arc<Node>) {
    let a = Arc::new(Node {
        label: "a",
        next: OnceLock::new(),
    });
    let b = Arc::new(Node {
        label: "b",
        next: OnceLock::new(),
    });
    let _ = a.next.set(Arc::downgrade(&b));
    let _ = b.next.set(Arc::downgrade(&a));
    (a, b)
}

/// Continuation that counts how often it runs.
pub fn counting_next(counter: &Arc<AtomicUsize>) -> Next<'static> {
    let counter = counter.clone();
    Next::new(async move {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

/// Body of the response a terminal handler stored, as text.
pub async fn response_text(ctx: RequestContext) -> Option<String> {
    let (_, response) = ctx.into_parts();
    let bytes = axum::body::to_bytes(response?.into_body(), usize::MAX).await.ok()?;
    String::from_utf8(bytes.to_vec()).ok()
}
