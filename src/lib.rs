//! redis-key-analyzer - Redis keyspace memory analysis by key pattern
//!
//! Scans a Redis database without writing to it, collects type, TTL, memory
//! usage and element count for every key, and groups keys into patterns such
//! as `user:<*>` or `session:<N>:token` so that the memory hogs of a keyspace
//! show up as a handful of report rows instead of millions of keys.
//!
//! # Features
//!
//! - **Atomic batch fetch**: One server-side script call per SCAN batch
//!   returns every key of the batch together with its metadata.
//!
//! - **Bounded memory**: Keys are streamed batch by batch and folded into
//!   per-pattern accumulators; no key list is ever held in full.
//!
//! - **Gentle on production**: Optional sleep between batches, a key limit,
//!   and a read-only gate that refuses to run against a primary.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Redis Server                              │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               │ EVALSHA (SCAN + TYPE/TTL/MEMORY USAGE/size)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │   store::RedisStore  ──▶  scan::KeyScanner  (lazy, per batch)    │
//! │                                   │                              │
//! │                                   │ KeyRecord                    │
//! │                                   ▼                              │
//! │   pattern::PatternRules  ──▶  analyze::Aggregator                │
//! │      (key -> pattern)          (pattern, type, ttl) buckets      │
//! │                                   │                              │
//! │                                   ▼                              │
//! │                         report::build_report                     │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               ▼
//!                  ┌────────────────────────────┐
//!                  │ TableSink / JsonSink       │
//!                  └────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```bash
//! # Analyze the default database of a local server
//! rka
//!
//! # Only session keys, politely, and only if this is a replica
//! rka --host 10.0.0.5 --read-only -m 'session:*' --sleep 0.05
//! ```

pub mod analyze;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod pattern;
pub mod progress;
pub mod report;
pub mod scan;
pub mod store;

pub use analyze::{Aggregator, PatternStat, TtlCategory};
pub use config::{AnalyzeConfig, CliArgs, OutputFormat};
pub use coordinator::{analyze_source, AnalyzeCoordinator, AnalyzeOutcome, AnalyzeResult};
pub use error::{AnalyzerError, Result};
pub use pattern::{PatternRules, Separator};
pub use report::{build_report, Report, ReportRow};
pub use scan::{BatchSource, KeyRecord, KeyScanner, KeyType, ScanOptions};
pub use store::{RedisStore, ReplicationRole, StoreAddress};
