//! Backend selection at startup.
//!
//! The storage mode flag picks the backend once, for the process lifetime.
//! MySQL mode builds the pool, probes it, and creates the schema; any failure
//! on that path discards the partial client and downgrades to file storage.
//! There is no automatic retry while running.

use std::sync::Arc;

use tracing::{info, warn};

use homestead_core::{HomesteadConfig, StorageMode};

use crate::backend::{HomeBackend, SharedWorldView};
use crate::cache::HomeService;
use crate::file::FileBackend;
use crate::mysql::MysqlBackend;

/// Select and initialize the durable backend.
pub async fn init_backend(
    config: &HomesteadConfig,
    worlds: SharedWorldView,
) -> Arc<dyn HomeBackend> {
    match config.storage.mode {
        StorageMode::Mysql => {
            match MysqlBackend::connect(&config.storage.mysql, Arc::clone(&worlds)).await {
                Ok(backend) => {
                    info!("storage: MySQL");
                    Arc::new(backend)
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        "failed to initialize MySQL, falling back to file storage for this process"
                    );
                    file_backend(config, worlds)
                }
            }
        }
        StorageMode::File => {
            info!("storage: file");
            file_backend(config, worlds)
        }
    }
}

/// Select the backend and wire the cache service in front of it.
pub async fn init_service(config: &HomesteadConfig, worlds: SharedWorldView) -> HomeService {
    let backend = init_backend(config, worlds).await;
    HomeService::new(backend, &config.cache)
}

fn file_backend(config: &HomesteadConfig, worlds: SharedWorldView) -> Arc<dyn HomeBackend> {
    Arc::new(FileBackend::new(&config.storage.data_dir, worlds))
}
