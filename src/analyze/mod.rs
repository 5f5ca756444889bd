//! Incremental aggregation of key records into per-pattern statistics

pub mod aggregator;

pub use aggregator::{Aggregator, BucketKey, PatternStat, TtlCategory};
