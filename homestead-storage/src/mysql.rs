//! Pooled MySQL backend.
//!
//! Owns the connection pool and the schema. `connect` builds the pool, runs a
//! round-trip probe, and creates the tables if they are absent; any failure
//! there bubbles up so the bootstrap can fall back to file storage. After
//! that, every operation catches its own errors: a failed query is logged and
//! treated as "no data" / "write not applied" for that single call, and the
//! pool survives it.

use std::time::Duration;

use sqlx::mysql::{MySqlPool, MySqlPoolOptions};
use sqlx::FromRow;
use tracing::{debug, info, warn};

use homestead_core::{home_key, now_ms, Home, MysqlConfig, OwnerHomes, OwnerId, Result};

use crate::backend::{HomeBackend, SharedWorldView};

/// Idle connections kept warm in the pool
const MIN_IDLE_CONNECTIONS: u32 = 2;
/// Idle timeout before a pooled connection is dropped
const IDLE_TIMEOUT: Duration = Duration::from_secs(600);
/// Maximum lifetime of any pooled connection
const MAX_LIFETIME: Duration = Duration::from_secs(1800);

/// MySQL implementation of home storage
pub struct MysqlBackend {
    pool: MySqlPool,
    worlds: SharedWorldView,
}

#[derive(Debug, FromRow)]
struct HomeRow {
    home_name: String,
    world: String,
    x: f64,
    y: f64,
    z: f64,
    yaw: f32,
    pitch: f32,
    created_at: i64,
}

impl MysqlBackend {
    /// Build the pool, probe connectivity, and create the schema.
    pub async fn connect(config: &MysqlConfig, worlds: SharedWorldView) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.pool_size)
            .min_connections(MIN_IDLE_CONNECTIONS)
            .acquire_timeout(Duration::from_millis(config.connect_timeout_ms))
            .idle_timeout(IDLE_TIMEOUT)
            .max_lifetime(MAX_LIFETIME)
            .connect(&config.url())
            .await?;

        // Round-trip probe before we commit to this backend
        sqlx::query("SELECT 1").execute(&pool).await?;

        let backend = Self { pool, worlds };
        backend.create_tables().await?;

        info!(
            host = %config.host,
            database = %config.database,
            pool_size = config.pool_size,
            "MySQL connection established"
        );
        Ok(backend)
    }

    /// Create the homes, owners, and statistics tables if absent
    async fn create_tables(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS homestead_homes (
                id INT AUTO_INCREMENT PRIMARY KEY,
                owner_uuid VARCHAR(36) NOT NULL,
                home_name VARCHAR(32) NOT NULL,
                world VARCHAR(64) NOT NULL,
                x DOUBLE NOT NULL,
                y DOUBLE NOT NULL,
                z DOUBLE NOT NULL,
                yaw FLOAT NOT NULL,
                pitch FLOAT NOT NULL,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL,
                UNIQUE KEY owner_home (owner_uuid, home_name),
                INDEX idx_owner_uuid (owner_uuid)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS homestead_owners (
                id INT AUTO_INCREMENT PRIMARY KEY,
                uuid VARCHAR(36) NOT NULL UNIQUE,
                name VARCHAR(16) NOT NULL,
                last_seen BIGINT NOT NULL
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS homestead_statistics (
                id INT AUTO_INCREMENT PRIMARY KEY,
                owner_uuid VARCHAR(36) NOT NULL,
                home_name VARCHAR(32) NOT NULL,
                visit_count INT NOT NULL DEFAULT 0,
                last_visited BIGINT,
                UNIQUE KEY owner_home_stats (owner_uuid, home_name),
                INDEX idx_owner_stats (owner_uuid)
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
            "#,
        )
        .execute(&self.pool)
        .await?;

        debug!("database tables created/verified");
        Ok(())
    }

    async fn try_load_all(&self, owner: OwnerId) -> Result<OwnerHomes> {
        let rows: Vec<HomeRow> = sqlx::query_as(
            r#"
            SELECT home_name, world, x, y, z, yaw, pitch, created_at
            FROM homestead_homes
            WHERE owner_uuid = ?
            "#,
        )
        .bind(owner.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut homes = OwnerHomes::new();
        for row in rows {
            if !self.worlds.world_exists(&row.world) {
                warn!(
                    owner = %owner,
                    home = %row.home_name,
                    world = %row.world,
                    "world no longer exists, skipping stored home"
                );
                continue;
            }
            let home = Home::from_parts(
                row.home_name,
                row.world,
                row.x,
                row.y,
                row.z,
                row.yaw,
                row.pitch,
                row.created_at,
            );
            homes.insert(home.key(), home);
        }
        Ok(homes)
    }

    async fn try_save_one(&self, owner: OwnerId, home: &Home) -> Result<()> {
        // created_at is written once; later upserts only touch updated_at
        sqlx::query(
            r#"
            INSERT INTO homestead_homes
                (owner_uuid, home_name, world, x, y, z, yaw, pitch, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                world = VALUES(world), x = VALUES(x), y = VALUES(y), z = VALUES(z),
                yaw = VALUES(yaw), pitch = VALUES(pitch), updated_at = VALUES(updated_at)
            "#,
        )
        .bind(owner.to_string())
        .bind(&home.name)
        .bind(&home.world_id)
        .bind(home.x)
        .bind(home.y)
        .bind(home.z)
        .bind(home.yaw)
        .bind(home.pitch)
        .bind(home.created_at_ms)
        .bind(now_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn try_delete_one(&self, owner: OwnerId, name: &str) -> Result<()> {
        sqlx::query("DELETE FROM homestead_homes WHERE owner_uuid = ? AND home_name = ?")
            .bind(owner.to_string())
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn try_delete_all(&self, owner: OwnerId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM homestead_homes WHERE owner_uuid = ?")
            .bind(owner.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn try_touch_owner(&self, owner: OwnerId, display_name: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO homestead_owners (uuid, name, last_seen)
            VALUES (?, ?, ?)
            ON DUPLICATE KEY UPDATE name = VALUES(name), last_seen = VALUES(last_seen)
            "#,
        )
        .bind(owner.to_string())
        .bind(display_name)
        .bind(now_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn try_record_visit(&self, owner: OwnerId, name: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO homestead_statistics (owner_uuid, home_name, visit_count, last_visited)
            VALUES (?, ?, 1, ?)
            ON DUPLICATE KEY UPDATE
                visit_count = visit_count + 1, last_visited = VALUES(last_visited)
            "#,
        )
        .bind(owner.to_string())
        .bind(home_key(name))
        .bind(now_ms())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Total number of stored homes across all owners
    pub async fn total_homes(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM homestead_homes")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Total recorded visits for one owner
    pub async fn visit_count(&self, owner: OwnerId) -> Result<i64> {
        // SUM on INT yields DECIMAL; cast so the driver hands back a BIGINT
        let (total,): (i64,) = sqlx::query_as(
            "SELECT CAST(COALESCE(SUM(visit_count), 0) AS SIGNED) \
             FROM homestead_statistics WHERE owner_uuid = ?",
        )
        .bind(owner.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

#[async_trait::async_trait]
impl HomeBackend for MysqlBackend {
    async fn load_all(&self, owner: OwnerId) -> OwnerHomes {
        match self.try_load_all(owner).await {
            Ok(homes) => homes,
            Err(err) => {
                warn!(owner = %owner, error = %err, "failed to load homes from MySQL");
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
        match self.try_delete_all(owner).await {
            Ok(deleted) => debug!(owner = %owner, deleted, "deleted all homes"),
            Err(err) => warn!(owner = %owner, error = %err, "failed to delete all homes"),
        }
    }

    async fn touch_owner(&self, owner: OwnerId, display_name: &str) {
        if let Err(err) = self.try_touch_owner(owner, display_name).await {
            warn!(owner = %owner, error = %err, "failed to update owner record");
        }
    }

    async fn record_visit(&self, owner: OwnerId, name: &str) {
        if let Err(err) = self.try_record_visit(owner, name).await {
            warn!(owner = %owner, home = %name, error = %err, "failed to record visit");
        }
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("MySQL connection pool closed");
    }
}
