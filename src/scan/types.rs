//! Key metadata types produced by the enumerator
//!
//! One `KeyRecord` is created per key observed in a scanned batch and is
//! consumed once by the aggregator.

use serde::Serialize;
use std::fmt;

/// Redis data type of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// Plain string value
    String,
    /// List
    List,
    /// Unordered set
    Set,
    /// Sorted set
    #[serde(rename = "zset")]
    SortedSet,
    /// Hash
    Hash,
    /// Anything else (streams, module types, or a key that vanished)
    Unknown,
}

impl KeyType {
    /// Convert from the name returned by the `TYPE` command
    pub fn from_redis_type(name: &str) -> Self {
        match name {
            "string" => KeyType::String,
            "list" => KeyType::List,
            "set" => KeyType::Set,
            "zset" => KeyType::SortedSet,
            "hash" => KeyType::Hash,
            _ => KeyType::Unknown,
        }
    }

    /// Name as shown in reports (matches the `TYPE` command)
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::String => "string",
            KeyType::List => "list",
            KeyType::Set => "set",
            KeyType::SortedSet => "zset",
            KeyType::Hash => "hash",
            KeyType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for a single key, fetched in the same atomic batch as the SCAN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecord {
    /// Concrete key name
    pub key: String,

    /// Data type
    pub key_type: KeyType,

    /// Seconds to live: `-1` no expiry, `-2` key gone, otherwise remaining seconds
    pub ttl: i64,

    /// Server-side memory estimate in bytes
    pub memory: u64,

    /// Type-specific cardinality (string length, element count); 0 for unknown
    pub size: u64,
}

impl KeyRecord {
    /// Create a record
    pub fn new(key: impl Into<String>, key_type: KeyType, ttl: i64, memory: u64, size: u64) -> Self {
        Self {
            key: key.into(),
            key_type,
            ttl,
            memory,
            size,
        }
    }
}

/// Opaque server-side SCAN cursor
///
/// `0` both starts and terminates a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScanCursor(pub u64);

impl ScanCursor {
    /// The cursor that starts a scan
    pub const START: ScanCursor = ScanCursor(0);

    /// True when the server handed back the start sentinel
    pub fn is_start(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ScanCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One round trip's worth of records
#[derive(Debug, Clone, Default)]
pub struct ScanBatch {
    /// Cursor to pass to the next fetch
    pub next_cursor: ScanCursor,

    /// Records in server order
    pub records: Vec<KeyRecord>,
}
