//! YAML file backend.
//!
//! One document per owner, `<owner-uuid>.yml`, inside a dedicated directory
//! created lazily on first write. Every change loads the full set, mutates it
//! in memory, and rewrites the whole file through a `.tmp` sibling so a crash
//! mid-write never leaves a torn document. One malformed record is skipped
//! with a warning; the rest of the owner's set still loads.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use homestead_core::{home_key, Home, OwnerHomes, OwnerId, Result, StorageError};

use crate::backend::{HomeBackend, SharedWorldView};

/// File-per-owner implementation of home storage
pub struct FileBackend {
    dir: PathBuf,
    worlds: SharedWorldView,
}

/// On-disk shape of a single home entry, keyed by display name
#[derive(Debug, Serialize, Deserialize)]
struct HomeRecord {
    world: String,
    x: f64,
    y: f64,
    z: f64,
    yaw: f32,
    pitch: f32,
    created: i64,
}

#[derive(Debug, Serialize)]
struct OwnerDoc {
    homes: BTreeMap<String, HomeRecord>,
}

impl From<&Home> for HomeRecord {
    fn from(home: &Home) -> Self {
        Self {
            world: home.world_id.clone(),
            x: home.x,
            y: home.y,
            z: home.z,
            yaw: home.yaw,
            pitch: home.pitch,
            created: home.created_at_ms,
        }
    }
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>, worlds: SharedWorldView) -> Self {
        Self {
            dir: dir.into(),
            worlds,
        }
    }

    /// Directory holding the per-owner files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn owner_path(&self, owner: OwnerId) -> PathBuf {
        self.dir.join(format!("{owner}.yml"))
    }

    async fn try_load_all(&self, owner: OwnerId) -> Result<OwnerHomes> {
        let path = self.owner_path(owner);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(OwnerHomes::new()),
            Err(err) => return Err(err.into()),
        };

        let doc: serde_yaml::Value = serde_yaml::from_str(&content)
            .map_err(|err| StorageError::yaml(path.display().to_string(), err))?;

        let mut homes = OwnerHomes::new();
        let Some(entries) = doc.get("homes").and_then(|v| v.as_mapping()) else {
            return Ok(homes);
        };

        for (key, value) in entries {
            let Some(name) = key.as_str() else {
                warn!(owner = %owner, "non-string home name in file, skipping record");
                continue;
            };
            let record: HomeRecord = match serde_yaml::from_value(value.clone()) {
                Ok(record) => record,
                Err(err) => {
                    warn!(owner = %owner, home = %name, error = %err, "malformed home record, skipping");
                    continue;
                }
            };
            if !self.worlds.world_exists(&record.world) {
                warn!(
                    owner = %owner,
                    home = %name,
                    world = %record.world,
                    "world no longer exists, skipping stored home"
                );
                continue;
            }
            let home = Home::from_parts(
                name,
                record.world,
                record.x,
                record.y,
                record.z,
                record.yaw,
                record.pitch,
                record.created,
            );
            homes.insert(home.key(), home);
        }
        Ok(homes)
    }

    /// Serialize the full set and swap it into place
    async fn rewrite(&self, owner: OwnerId, homes: &OwnerHomes) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;

        let doc = OwnerDoc {
            homes: homes
                .values()
                .map(|home| (home.name.clone(), HomeRecord::from(home)))
                .collect(),
        };
        let content = serde_yaml::to_string(&doc)
            .map_err(|err| StorageError::yaml(format!("owner {owner}"), err))?;

        let path = self.owner_path(owner);
        let tmp = path.with_extension("yml.tmp");
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &path).await?;
        debug!(owner = %owner, homes = homes.len(), "rewrote owner file");
        Ok(())
    }

    async fn try_save_one(&self, owner: OwnerId, home: &Home) -> Result<()> {
        // a whole-file parse failure fails the write instead of rewriting
        // from an empty set over records that are still on disk
        let mut homes = self.try_load_all(owner).await?;
        homes.insert(home.key(), home.clone());
        self.rewrite(owner, &homes).await
    }

    async fn try_delete_one(&self, owner: OwnerId, name: &str) -> Result<()> {
        let mut homes = self.try_load_all(owner).await?;
        if homes.remove(&home_key(name)).is_none() {
            // nothing stored under that name; don't touch the file
            return Ok(());
        }
        self.rewrite(owner, &homes).await
    }

    async fn try_delete_all(&self, owner: OwnerId) -> Result<()> {
        match fs::remove_file(self.owner_path(owner)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait::async_trait]
impl HomeBackend for FileBackend {
    async fn load_all(&self, owner: OwnerId) -> OwnerHomes {
        match self.try_load_all(owner).await {
            Ok(homes) => homes,
            Err(err) => {
                warn!(owner = %owner, error = %err, "failed to load owner file");
                OwnerHomes::new()
            }
        }
    }

    async fn save_one(&self, owner: OwnerId, home: &Home) {
        if let Err(err) = self.try_save_one(owner, home).await {
            warn!(owner = %owner, home = %home.name, error = %err, "failed to save home");
        }
    }

    async fn delete_one(&self, owner: OwnerId, name: &str) {
        if let Err(err) = self.try_delete_one(owner, name).await {
            warn!(owner = %owner, home = %name, error = %err, "failed to delete home");
        }
    }

    async fn delete_all(&self, owner: OwnerId) {
        if let Err(err) = self.try_delete_all(owner).await {
            warn!(owner = %owner, error = %err, "failed to delete all homes");
        }
    }
}
