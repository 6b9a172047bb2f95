//! homestead-core: record model, configuration, and errors
//!
//! Shared foundation for the homestead storage stack. The storage crate
//! builds the backends and the cache service on top of these types.

pub mod config;
pub mod error;
pub mod home;

pub use config::{CacheConfig, HomesteadConfig, MysqlConfig, StorageConfig, StorageMode};
pub use error::{Result, StorageError};
pub use home::{home_key, is_valid_name, now_ms, Home, OwnerHomes, OwnerId, MAX_NAME_LEN};
