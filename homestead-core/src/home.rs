//! Home records and owner identity.
//!
//! A [`Home`] is an immutable snapshot of a named location: the world it
//! belongs to, coordinates, orientation, and a creation timestamp that
//! survives updates. Within one owner's set, names are unique
//! case-insensitively; the original casing is preserved for display.

use std::collections::HashMap;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StorageError};

/// Stable unique identifier of the owner a home set belongs to
pub type OwnerId = Uuid;

/// One owner's home set, keyed by lower-cased home name
pub type OwnerHomes = HashMap<String, Home>;

/// Maximum accepted home name length
pub const MAX_NAME_LEN: usize = 16;

static VALID_HOME_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z0-9_]+$").expect("valid home name pattern"));

/// A named saved location
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Home {
    /// Display name; compared and keyed lower-cased
    pub name: String,
    /// Identifier of the world the location belongs to
    pub world_id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f32,
    pub pitch: f32,
    /// Milliseconds since epoch, set once at creation and never updated
    pub created_at_ms: i64,
}

impl Home {
    /// Create a new home stamped with the current wall clock.
    ///
    /// Rejects names outside `[A-Za-z0-9_]` or longer than
    /// [`MAX_NAME_LEN`] characters.
    pub fn new(
        name: impl Into<String>,
        world_id: impl Into<String>,
        x: f64,
        y: f64,
        z: f64,
        yaw: f32,
        pitch: f32,
    ) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            world_id: world_id.into(),
            x,
            y,
            z,
            yaw,
            pitch,
            created_at_ms: now_ms(),
        })
    }

    /// Reconstruct a home from stored fields. Used when restoring from a
    /// backend; stored names are trusted as-is.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        name: impl Into<String>,
        world_id: impl Into<String>,
        x: f64,
        y: f64,
        z: f64,
        yaw: f32,
        pitch: f32,
        created_at_ms: i64,
    ) -> Self {
        Self {
            name: name.into(),
            world_id: world_id.into(),
            x,
            y,
            z,
            yaw,
            pitch,
            created_at_ms,
        }
    }

    /// The map key this home lives under in an [`OwnerHomes`] set
    pub fn key(&self) -> String {
        home_key(&self.name)
    }
}

/// Lower-cased lookup key for a home name
pub fn home_key(name: &str) -> String {
    name.to_lowercase()
}

/// Whether a name is acceptable for a new home
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LEN && VALID_HOME_NAME.is_match(name)
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StorageError::invalid_home_name(name, "name is empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(StorageError::invalid_home_name(
            name,
            format!("longer than {MAX_NAME_LEN} characters"),
        ));
    }
    if !VALID_HOME_NAME.is_match(name) {
        return Err(StorageError::invalid_home_name(
            name,
            "only letters, digits and underscores are allowed",
        ));
    }
    Ok(())
}

/// Current wall clock in milliseconds since epoch
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_simple_names() {
        assert!(is_valid_name("spawn"));
        assert!(is_valid_name("Base_2"));
        assert!(is_valid_name("a"));
        assert!(is_valid_name("exactly_sixteen_"));
    }

    #[test]
    fn rejects_bad_names() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("seventeen_chars__"));
        assert!(!is_valid_name("has space"));
        assert!(!is_valid_name("nöt_ascii"));
        assert!(!is_valid_name("semi;colon"));
    }

    #[test]
    fn new_rejects_invalid_name() {
        let err = Home::new("bad name", "world", 0.0, 0.0, 0.0, 0.0, 0.0);
        assert!(matches!(
            err,
            Err(StorageError::InvalidHomeName { .. })
        ));
    }

    #[test]
    fn key_is_lowercased_and_casing_preserved() {
        let home = Home::new("MyBase", "world", 1.0, 2.0, 3.0, 0.0, 0.0).unwrap();
        assert_eq!(home.key(), "mybase");
        assert_eq!(home.name, "MyBase");
    }

    #[test]
    fn new_stamps_creation_time() {
        let before = now_ms();
        let home = Home::new("spawn", "world", 0.0, 64.0, 0.0, 90.0, 0.0).unwrap();
        let after = now_ms();
        assert!(home.created_at_ms >= before && home.created_at_ms <= after);
    }
}
