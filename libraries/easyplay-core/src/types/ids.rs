/// Identifier types for EasyPlay entities
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Playlist item identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new item ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random item ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a locally picked binary (image, video, PDF, ...)
///
/// Handles live only as long as the host session: they are never
/// serialized, so a reloaded playlist comes back without them and the
/// affected items are flagged missing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BinaryHandle {
    key: String,
    file_name: String,
}

impl BinaryHandle {
    /// Create a handle from a host-assigned key and the original file name
    pub fn new(key: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            file_name: file_name.into(),
        }
    }

    /// Host-assigned key used to resolve the binary
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Original file name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for BinaryHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file_name, self.key)
    }
}
