//! Sample handler graph served by the binary.
//!
//! ```text
//! Root
//!  ├─ Users ── {u64} ── User ── Profile
//!  └─ Health
//! ```
//!
//! `Users` resolves its indexed child asynchronously against a `UserStore`.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum::Json;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::http::context::RequestContext;
use crate::routing::{Handler, HandlerRef, Next, RouteResult, Routes};

/// A user known to the demo store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: u64,
    pub name: String,
    pub bio: String,
}

/// In-memory user storage.
#[derive(Debug, Default)]
pub struct UserStore {
    users: DashMap<u64, UserRecord>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a couple of users.
    pub fn seeded() -> Self {
        let store = Self::new();
        store.insert(UserRecord {
            id: 1,
            name: "ada".into(),
            bio: "Analytical engines".into(),
        });
        store.insert(UserRecord {
            id: 123,
            name: "grace".into(),
            bio: "Compilers and nanoseconds".into(),
        });
        store
    }

    pub fn insert(&self, record: UserRecord) {
        self.users.insert(record.id, record);
    }

    pub async fn get(&self, id: u64) -> Option<UserRecord> {
        self.users.get(&id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

pub struct RootHandler {
    users: Arc<UsersHandler>,
    health: Arc<HealthHandler>,
}

impl RootHandler {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self {
            users: Arc::new(UsersHandler { store }),
            health: Arc::new(HealthHandler),
        }
    }
}

#[async_trait]
impl Handler for RootHandler {
    async fn handle(&self, ctx: &mut RequestContext, _next: Next<'_>) -> RouteResult<()> {
        ctx.respond(Json(serde_json::json!({
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })));
        Ok(())
    }

    fn routes(&self) -> Routes {
        Routes::builder::<Self>()
            .child("Users", |root| root.users.clone())
            .child("Health", |root| root.health.clone())
            .build()
    }
}

pub struct UsersHandler {
    store: Arc<UserStore>,
}

#[async_trait]
impl Handler for UsersHandler {
    async fn handle(&self, ctx: &mut RequestContext, _next: Next<'_>) -> RouteResult<()> {
        let mut users: Vec<UserRecord> = self
            .store
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        users.sort_by_key(|user| user.id);
        ctx.respond(Json(users));
        Ok(())
    }

    fn routes(&self) -> Routes {
        Routes::builder::<Self>()
            .indexer_async(|users: Arc<UsersHandler>, id: u64| async move {
                users.store.get(id).await.map(|record| Arc::new(UserHandler::new(record)))
            })
            .build()
    }
}

pub struct UserHandler {
    record: UserRecord,
    profile: Arc<ProfileHandler>,
}

impl UserHandler {
    fn new(record: UserRecord) -> Self {
        let profile = Arc::new(ProfileHandler {
            name: record.name.clone(),
            bio: record.bio.clone(),
        });
        Self { record, profile }
    }
}

#[async_trait]
impl Handler for UserHandler {
    async fn handle(&self, ctx: &mut RequestContext, _next: Next<'_>) -> RouteResult<()> {
        ctx.respond(Json(self.record.clone()));
        Ok(())
    }

    fn routes(&self) -> Routes {
        Routes::builder::<Self>()
            .child("Profile", |user| user.profile.clone())
            .build()
    }
}

pub struct ProfileHandler {
    name: String,
    bio: String,
}

#[async_trait]
impl Handler for ProfileHandler {
    async fn handle(&self, ctx: &mut RequestContext, _next: Next<'_>) -> RouteResult<()> {
        ctx.respond(Json(serde_json::json!({
            "name": self.name,
            "bio": self.bio,
        })));
        Ok(())
    }
}

pub struct HealthHandler;

#[async_trait]
impl Handler for HealthHandler {
    async fn handle(&self, ctx: &mut RequestContext, _next: Next<'_>) -> RouteResult<()> {
        ctx.respond((StatusCode::OK, "ok"));
        Ok(())
    }
}

/// Build the demo graph over `store`.
pub fn graph(store: Arc<UserStore>) -> HandlerRef {
    Arc::new(RootHandler::new(store))
}
