//! The durable-storage contract shared by both backends.
//!
//! Backends never surface errors to the control path: a failed load yields an
//! empty set, a failed write is logged and dropped. Callers that need to know
//! watch the logs; the cache keeps the most recent writes either way.

use std::sync::Arc;

use async_trait::async_trait;

use homestead_core::{Home, OwnerHomes, OwnerId};

/// Which worlds currently exist.
///
/// Stored records referencing a world this view rejects are skipped during
/// load instead of failing the whole set. The live session owns the real
/// implementation; [`AllWorlds`] accepts everything and is the default.
pub trait WorldView: Send + Sync {
    fn world_exists(&self, world_id: &str) -> bool;
}

/// Accepts every world id
#[derive(Debug, Clone, Copy, Default)]
pub struct AllWorlds;

impl WorldView for AllWorlds {
    fn world_exists(&self, _world_id: &str) -> bool {
        true
    }
}

/// Shared handle to a world view
pub type SharedWorldView = Arc<dyn WorldView>;

/// A durable storage implementation for per-owner home sets.
///
/// Implemented by [`MysqlBackend`](crate::mysql::MysqlBackend) and
/// [`FileBackend`](crate::file::FileBackend); exactly one is selected at
/// startup and injected into the cache service.
#[async_trait]
pub trait HomeBackend: Send + Sync {
    /// Load one owner's full home set. Internal errors yield an empty set.
    async fn load_all(&self, owner: OwnerId) -> OwnerHomes;

    /// Upsert one home by (owner, lower-cased name). Idempotent.
    async fn save_one(&self, owner: OwnerId, home: &Home);

    /// Delete one home by name. Deleting a missing home is a no-op.
    async fn delete_one(&self, owner: OwnerId, name: &str);

    /// Delete every home the owner has.
    async fn delete_all(&self, owner: OwnerId);

    /// Record the owner's display name and last-seen time.
    ///
    /// Identity rows live only in the relational store; the file backend
    /// keeps the default no-op.
    async fn touch_owner(&self, _owner: OwnerId, _display_name: &str) {}

    /// Bump the visit counter for one home.
    ///
    /// Statistics rows live only in the relational store; the file backend
    /// keeps the default no-op.
    async fn record_visit(&self, _owner: OwnerId, _name: &str) {}

    /// Release backend resources. Called once during teardown.
    async fn close(&self) {}
}
