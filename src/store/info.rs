//! INFO reply interpretation
//!
//! Only two sections matter here: `replication` (for the read-only gate) and
//! `keyspace` (for the progress bar total).

use redis::InfoDict;
use std::fmt;

/// Role reported by `INFO replication`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplicationRole {
    /// A writable primary (`role:master`)
    Primary,
    /// A read-only replica (`role:slave`)
    Replica,
    /// Missing or unrecognized role field
    Other(String),
}

impl ReplicationRole {
    /// Parse the `role` field value
    pub fn from_info_value(value: &str) -> Self {
        match value.trim() {
            "master" => ReplicationRole::Primary,
            "slave" | "replica" => ReplicationRole::Replica,
            other => ReplicationRole::Other(other.to_string()),
        }
    }

    /// Extract the role from a parsed INFO reply
    pub fn from_info(info: &InfoDict) -> Self {
        match info.get::<String>("role") {
            Some(role) => Self::from_info_value(&role),
            None => ReplicationRole::Other(String::new()),
        }
    }

    /// Only replicas pass the read-only gate
    pub fn is_replica(&self) -> bool {
        *self == ReplicationRole::Replica
    }
}

impl fmt::Display for ReplicationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReplicationRole::Primary => f.write_str("master"),
            ReplicationRole::Replica => f.write_str("slave"),
            ReplicationRole::Other(role) if role.is_empty() => f.write_str("unknown"),
            ReplicationRole::Other(role) => f.write_str(role),
        }
    }
}

/// Number of keys in database `db` according to `INFO keyspace`
///
/// The `db<N>` line looks like `keys=120,expires=4,avg_ttl=0`; a database with
/// no keys has no line at all.
pub fn keyspace_count(info: &InfoDict, db: u32) -> u64 {
    info.get::<String>(&format!("db{}", db))
        .as_deref()
        .and_then(parse_keys_field)
        .unwrap_or(0)
}

fn parse_keys_field(line: &str) -> Option<u64> {
    line.split(',')
        .filter_map(|field| field.split_once('='))
        .find(|(name, _)| name.trim() == "keys")
        .and_then(|(_, value)| value.trim().parse().ok())
}
