//! Write-through cache in front of the active backend.
//!
//! Every collaborator talks to [`HomeService`]; which backend sits behind it
//! is invisible. Reads come from the cache, loading from the backend once per
//! owner on a miss. Writes mutate the cached set first (visible to the very
//! next read) and enqueue the durable operation on a channel drained by a
//! single background writer task, so the caller never waits on I/O.
//!
//! A durable write that fails is logged and dropped, not retried: until the
//! next successful write or a restart, the cache holds the only copy of that
//! change. Known durability gap, carried over deliberately.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use moka::sync::Cache;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use homestead_core::{home_key, CacheConfig, Home, OwnerHomes, OwnerId};

use crate::backend::HomeBackend;

/// A durable operation queued for the background writer
enum PersistJob {
    Save(OwnerId, Home),
    DeleteOne(OwnerId, String),
    DeleteAll(OwnerId),
    TouchOwner(OwnerId, String),
    RecordVisit(OwnerId, String),
}

/// Cache-aside storage service for per-owner home sets.
///
/// Owner entries idle longer than the configured TTL are evicted, as is the
/// least-recently-used tail once the entry count exceeds its bound; eviction
/// never writes anything, the cache is not the sole copy of durable data.
pub struct HomeService {
    cache: Cache<OwnerId, OwnerHomes>,
    backend: Arc<dyn HomeBackend>,
    jobs: Mutex<Option<UnboundedSender<PersistJob>>>,
    writer: Mutex<Option<JoinHandle<()>>>,
}

impl HomeService {
    /// Wire the cache in front of an already-selected backend.
    ///
    /// Must run inside a tokio runtime; the writer task is spawned here.
    pub fn new(backend: Arc<dyn HomeBackend>, config: &CacheConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_idle(Duration::from_secs(config.ttl_seconds))
            .build();

        let (tx, rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(run_writer(rx, Arc::clone(&backend)));

        info!(
            ttl_seconds = config.ttl_seconds,
            max_entries = config.max_entries,
            "home cache initialized"
        );

        Self {
            cache,
            backend,
            jobs: Mutex::new(Some(tx)),
            writer: Mutex::new(Some(writer)),
        }
    }

    /// One home by name, case-insensitive. Loads the owner's set from the
    /// backend on a cache miss.
    pub async fn get_home(&self, owner: OwnerId, name: &str) -> Option<Home> {
        self.get_homes(owner).await.get(&home_key(name)).cloned()
    }

    /// Snapshot of the owner's full home set. Mutating the returned map does
    /// not touch cache state.
    pub async fn get_homes(&self, owner: OwnerId) -> OwnerHomes {
        if let Some(homes) = self.cache.get(&owner) {
            return homes;
        }
        let homes = self.backend.load_all(owner).await;
        self.cache.insert(owner, homes.clone());
        debug!(owner = %owner, homes = homes.len(), "loaded homes into cache");
        homes
    }

    /// Add or update a home. The cache entry is updated before this returns;
    /// the durable write happens in the background.
    ///
    /// An update under an existing name (case-insensitive) keeps the original
    /// creation time, for both backends.
    pub async fn set_home(&self, owner: OwnerId, mut home: Home) {
        let mut homes = self.get_homes(owner).await;
        if let Some(existing) = homes.get(&home.key()) {
            home.created_at_ms = existing.created_at_ms;
        }
        homes.insert(home.key(), home.clone());
        self.cache.insert(owner, homes);
        self.enqueue(PersistJob::Save(owner, home));
    }

    /// Remove a home. Symmetric to [`set_home`](Self::set_home).
    pub async fn delete_home(&self, owner: OwnerId, name: &str) {
        let mut homes = self.get_homes(owner).await;
        homes.remove(&home_key(name));
        self.cache.insert(owner, homes);
        self.enqueue(PersistJob::DeleteOne(owner, name.to_string()));
    }

    /// Wipe the owner's whole home set, cache and durable state.
    pub async fn delete_all_homes(&self, owner: OwnerId) {
        self.cache.insert(owner, OwnerHomes::new());
        self.enqueue(PersistJob::DeleteAll(owner));
    }

    /// Drop the owner's cache entry. Called when the owner's live session
    /// ends; durable state is untouched.
    pub fn unload_owner(&self, owner: OwnerId) {
        self.cache.invalidate(&owner);
        debug!(owner = %owner, "unloaded owner from cache");
    }

    /// Record the owner's display name and last-seen time in the background.
    pub fn touch_owner(&self, owner: OwnerId, display_name: &str) {
        self.enqueue(PersistJob::TouchOwner(owner, display_name.to_string()));
    }

    /// Bump the visit counter for one home in the background.
    pub fn record_visit(&self, owner: OwnerId, name: &str) {
        self.enqueue(PersistJob::RecordVisit(owner, name.to_string()));
    }

    /// Whether the owner currently has a live cache entry
    pub fn is_cached(&self, owner: OwnerId) -> bool {
        self.cache.contains_key(&owner)
    }

    /// Number of cached owner entries, after housekeeping
    pub fn cached_owners(&self) -> u64 {
        self.cache.run_pending_tasks();
        self.cache.entry_count()
    }

    /// Drain every pending durable write, then release the backend.
    pub async fn shutdown(&self) {
        let sender = self.jobs.lock().expect("persist queue lock").take();
        drop(sender);

        let handle = self.writer.lock().expect("writer handle lock").take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!(error = %err, "durable writer did not shut down cleanly");
            }
        }

        self.backend.close().await;
        info!("home storage shut down");
    }

    fn enqueue(&self, job: PersistJob) {
        let guard = self.jobs.lock().expect("persist queue lock");
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(job).is_err() {
                    warn!("durable writer is gone; dropping write");
                }
            }
            None => warn!("storage already shut down; dropping write"),
        }
    }
}

/// Apply queued durable operations until the service shuts down.
///
/// One task per service: jobs for the same owner are applied in dispatch
/// order, and dropping the sender lets the loop drain what is left.
async fn run_writer(mut rx: UnboundedReceiver<PersistJob>, backend: Arc<dyn HomeBackend>) {
    while let Some(job) = rx.recv().await {
        match job {
            PersistJob::Save(owner, home) => backend.save_one(owner, &home).await,
            PersistJob::DeleteOne(owner, name) => backend.delete_one(owner, &name).await,
            PersistJob::DeleteAll(owner) => backend.delete_all(owner).await,
            PersistJob::TouchOwner(owner, name) => backend.touch_owner(owner, &name).await,
            PersistJob::RecordVisit(owner, name) => backend.record_visit(owner, &name).await,
        }
    }
    debug!("durable writer drained");
}
