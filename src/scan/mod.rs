//! Batched key enumeration
//!
//! The enumerator walks the keyspace with a server-held SCAN cursor. Each
//! round trip is a single atomic script call that both matches keys and
//! collects their type, TTL, memory and size, so a record is never assembled
//! from two different points in time.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │          KeyScanner          │   Iterator<Item = Result<KeyRecord>>
//! │  - cursor bookkeeping        │
//! │  - limit / delay / shutdown  │
//! └──────────────┬───────────────┘
//!                │ fetch_batch(cursor, glob, count)
//!                ▼
//! ┌──────────────────────────────┐
//! │      dyn BatchSource         │   RedisStore, or an in-memory source in tests
//! └──────────────────────────────┘
//! ```

pub mod scanner;
pub mod types;

pub use scanner::{BatchSource, KeyScanner, ScanOptions};
pub use types::{KeyRecord, KeyType, ScanBatch, ScanCursor};
