//! Core type definitions for the CostDB engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a record within a table.
///
/// Keys are assigned by the table's key generator, start at 1, increase
/// monotonically, and are never reused within a table's lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordKey(pub u64);

impl RecordKey {
    /// Creates a record key from a raw value.
    #[must_use]
    pub const fn new(key: u64) -> Self {
        Self(key)
    }

    /// Returns the raw key value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next key in sequence.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "key:{}", self.0)
    }
}

/// Version of a database's schema.
///
/// Versions are positive integers and monotonically non-decreasing over
/// a database's lifetime. A database that has never been opened is at
/// version 0.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DatabaseVersion(pub u32);

impl DatabaseVersion {
    /// The version of a database that does not exist yet.
    pub const ZERO: Self = Self(0);

    /// Creates a database version.
    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    /// Returns the raw version value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DatabaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_ordering() {
        let k1 = RecordKey::new(1);
        let k2 = RecordKey::new(2);
        assert!(k1 < k2);
    }

    #[test]
    fn record_key_next() {
        let k = RecordKey::new(5);
        assert_eq!(k.next().as_u64(), 6);
    }

    #[test]
    fn record_key_display() {
        assert_eq!(format!("{}", RecordKey::new(42)), "key:42");
    }

    #[test]
    fn version_zero_is_lowest() {
        assert!(DatabaseVersion::ZERO < DatabaseVersion::new(1));
    }

    #[test]
    fn version_display() {
        assert_eq!(format!("{}", DatabaseVersion::new(3)), "v3");
    }
}
