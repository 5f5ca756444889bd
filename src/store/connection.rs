//! Redis connection wrapper
//!
//! Owns a single synchronous connection for the lifetime of a run. The
//! connection is opened once and never re-established; any failure is
//! returned to the caller as a `StoreError`.

use crate::error::{StoreError, StoreResult};
use crate::scan::{BatchSource, ScanBatch, ScanCursor};
use crate::store::info::{keyspace_count, ReplicationRole};
use crate::store::script::{decode_batch, RawBatchReply, SCAN_BATCH_SCRIPT};
use redis::{Client, Connection, InfoDict, Script};
use tracing::debug;

/// Host and port of the server to analyze
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreAddress {
    /// Hostname or IP
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl StoreAddress {
    /// Connection URL understood by the redis client
    pub fn to_url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

/// A live connection plus the loaded batch script
pub struct RedisStore {
    connection: Connection,
    script: Script,
    url: String,
}

impl RedisStore {
    /// Open a connection to `address`
    pub fn connect(address: &StoreAddress) -> StoreResult<Self> {
        let url = address.to_url();

        let client = Client::open(url.as_str()).map_err(|e| StoreError::ConnectionFailed {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        let connection = client
            .get_connection()
            .map_err(|e| StoreError::ConnectionFailed {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        debug!(url = %url, "Connected to Redis");

        Ok(Self {
            connection,
            script: Script::new(SCAN_BATCH_SCRIPT),
            url,
        })
    }

    /// URL this store is connected to
    pub fn url(&self) -> &str {
        &self.url
    }

    fn info(&mut self, section: &str) -> StoreResult<InfoDict> {
        redis::cmd("INFO")
            .arg(section)
            .query(&mut self.connection)
            .map_err(|e| StoreError::command("INFO", e))
    }

    /// Ask the server whether it is a primary or a replica
    pub fn replication_role(&mut self) -> StoreResult<ReplicationRole> {
        let info = self.info("replication")?;
        Ok(ReplicationRole::from_info(&info))
    }

    /// Total keys in `db` as reported by `INFO keyspace`
    pub fn key_count(&mut self, db: u32) -> StoreResult<u64> {
        let info = self.info("keyspace")?;
        Ok(keyspace_count(&info, db))
    }
}

impl BatchSource for RedisStore {
    fn select_database(&mut self, db: u32) -> StoreResult<()> {
        redis::cmd("SELECT")
            .arg(db)
            .query::<()>(&mut self.connection)
            .map_err(|e| StoreError::command("SELECT", e))
    }

    fn fetch_batch(
        &mut self,
        cursor: ScanCursor,
        match_glob: &str,
        batch_size: usize,
    ) -> StoreResult<ScanBatch> {
        let reply: RawBatchReply = self
            .script
            .arg(cursor.0)
            .arg(match_glob)
            .arg(batch_size)
            .invoke(&mut self.connection)
            .map_err(|e| StoreError::command("EVALSHA", e))?;

        decode_batch(reply)
    }
}
