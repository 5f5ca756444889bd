//! Report construction
//!
//! Turns the aggregator's buckets into ordered, display-ready rows. Nothing
//! in here performs I/O; rendering is left to a `ReportSink`.
//!
//! Rows are ordered so that the pattern groups using the most memory come
//! first, and within a group the heaviest bucket comes first.

pub mod render;

pub use render::{readable_bytes, JsonSink, ReportSink, TableSink};

use crate::analyze::{PatternStat, TtlCategory};
use crate::scan::KeyType;
use serde::Serialize;
use std::cmp::Reverse;
use std::collections::HashMap;

/// Column headers, in row order
pub const REPORT_FIELDS: [&str; 13] = [
    "pattern",
    "type",
    "ttl",
    "avg_ttl",
    "max_ttl",
    "count",
    "total_memory",
    "memory_hu",
    "memory_avg",
    "memory_max",
    "size_avg",
    "size_max",
    "key(max_ttl)",
];

/// One display row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub pattern: String,
    #[serde(rename = "type")]
    pub key_type: KeyType,
    pub ttl: TtlCategory,
    pub avg_ttl: i64,
    pub max_ttl: i64,
    pub count: u64,
    pub total_memory: u64,
    pub memory_hu: String,
    pub memory_avg: u64,
    pub memory_max: u64,
    pub size_avg: u64,
    pub size_max: u64,
    pub max_ttl_key: String,
}

impl ReportRow {
    /// Derive display fields from a bucket
    pub fn from_stat(stat: &PatternStat) -> Self {
        Self {
            pattern: stat.pattern.clone(),
            key_type: stat.key_type,
            ttl: stat.ttl,
            avg_ttl: stat.avg_ttl(),
            max_ttl: stat.max_ttl,
            count: stat.count,
            total_memory: stat.total_memory,
            memory_hu: readable_bytes(stat.total_memory),
            memory_avg: stat.avg_memory(),
            memory_max: stat.max_memory,
            size_avg: stat.avg_size(),
            size_max: stat.max_size,
            max_ttl_key: stat.max_ttl_key.clone(),
        }
    }

    /// Cell text, in `REPORT_FIELDS` order
    pub fn cells(&self) -> [String; 13] {
        [
            self.pattern.clone(),
            self.key_type.to_string(),
            self.ttl.to_string(),
            self.avg_ttl.to_string(),
            self.max_ttl.to_string(),
            self.count.to_string(),
            self.total_memory.to_string(),
            self.memory_hu.clone(),
            self.memory_avg.to_string(),
            self.memory_max.to_string(),
            self.size_avg.to_string(),
            self.size_max.to_string(),
            self.max_ttl_key.clone(),
        ]
    }
}

/// Ordered report rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Report {
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when there is nothing to show
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of `total_memory` over all rows
    pub fn total_memory(&self) -> u64 {
        self.rows.iter().map(|r| r.total_memory).sum()
    }
}

/// Order buckets by (pattern group memory, bucket memory), both descending
///
/// Equal keys are further ordered by pattern, type and TTL category so the
/// output does not depend on hash map iteration order.
pub fn sort_for_report(mut stats: Vec<PatternStat>) -> Vec<PatternStat> {
    let mut group_memory: HashMap<String, u64> = HashMap::new();
    for stat in &stats {
        *group_memory.entry(stat.pattern.clone()).or_insert(0) += stat.total_memory;
    }

    stats.sort_by_cached_key(|stat| {
        (
            Reverse(group_memory[&stat.pattern]),
            Reverse(stat.total_memory),
            stat.pattern.clone(),
            stat.key_type,
            stat.ttl,
        )
    });
    stats
}

/// Sort buckets and derive display rows, keeping at most `top` rows
pub fn build_report(stats: Vec<PatternStat>, top: Option<usize>) -> Report {
    let mut rows: Vec<ReportRow> = sort_for_report(stats)
        .iter()
        .map(ReportRow::from_stat)
        .collect();

    if let Some(top) = top {
        rows.truncate(top);
    }

    Report { rows }
}
