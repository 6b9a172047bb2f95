//! homestead-storage: durable home storage behind a write-through cache
//!
//! Two interchangeable backends (pooled MySQL, one YAML file per owner)
//! satisfy one contract; the bootstrap picks one at startup and wires it
//! behind [`HomeService`], the only type upstream collaborators touch.
//!
//! ```no_run
//! use std::sync::Arc;
//! use homestead_core::{Home, HomesteadConfig};
//! use homestead_storage::{bootstrap, AllWorlds};
//!
//! # async fn example() -> homestead_core::Result<()> {
//! let config = HomesteadConfig::from_path("homestead.toml")?;
//! let service = bootstrap::init_service(&config, Arc::new(AllWorlds)).await;
//!
//! let owner = uuid::Uuid::new_v4();
//! service.set_home(owner, Home::new("spawn", "world", 0.0, 64.0, 0.0, 0.0, 0.0)?).await;
//! assert!(service.get_home(owner, "Spawn").await.is_some());
//!
//! service.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod bootstrap;
pub mod cache;
pub mod file;
pub mod mysql;

pub use backend::{AllWorlds, HomeBackend, SharedWorldView, WorldView};
pub use cache::HomeService;
pub use file::FileBackend;
pub use mysql::MysqlBackend;
