//! Redis access
//!
//! Everything that speaks the wire protocol lives here: the connection, the
//! atomic batch script, and INFO parsing for the read-only gate.

pub mod connection;
pub mod info;
pub mod script;

pub use connection::{RedisStore, StoreAddress};
pub use info::{keyspace_count, ReplicationRole};
pub use script::{decode_batch, SCAN_BATCH_SCRIPT};
