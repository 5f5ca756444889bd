//! Single-pass per-pattern statistics
//!
//! Records are folded into buckets keyed by (pattern, type, TTL category).
//! Only the buckets are kept in memory; the raw records are dropped as soon
//! as they are folded.

use crate::scan::types::{KeyRecord, KeyType};
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt;

/// Coarse TTL classification of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TtlCategory {
    /// No expiry set (`TTL` returned -1)
    #[serde(rename = "NOTTL")]
    NoTtl,
    /// Expiry set (`TTL` returned >= 0)
    #[serde(rename = "TTL")]
    Ttl,
}

impl TtlCategory {
    /// Classify a TTL reply; `None` means the record must be dropped
    pub fn classify(ttl: i64) -> Option<Self> {
        match ttl {
            -1 => Some(TtlCategory::NoTtl),
            t if t >= 0 => Some(TtlCategory::Ttl),
            _ => None,
        }
    }

    /// Label used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            TtlCategory::NoTtl => "NOTTL",
            TtlCategory::Ttl => "TTL",
        }
    }
}

impl fmt::Display for TtlCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one aggregation bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    pub pattern: String,
    pub key_type: KeyType,
    pub ttl: TtlCategory,
}

/// Running statistics for one bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatternStat {
    pub pattern: String,
    pub key_type: KeyType,
    pub ttl: TtlCategory,
    pub count: u64,
    pub total_memory: u64,
    pub max_memory: u64,
    pub total_size: u64,
    pub max_size: u64,
    /// Sum of raw TTLs; only meaningful for `TtlCategory::Ttl` buckets
    pub total_ttl: i64,
    pub max_ttl: i64,
    /// Key that produced `max_ttl`
    pub max_ttl_key: String,
    /// First key ever folded into this bucket
    pub sample_key: String,
}

impl PatternStat {
    fn seed(bucket: &BucketKey, record: &KeyRecord) -> Self {
        Self {
            pattern: bucket.pattern.clone(),
            key_type: bucket.key_type,
            ttl: bucket.ttl,
            count: 0,
            total_memory: 0,
            max_memory: 0,
            total_size: 0,
            max_size: 0,
            total_ttl: 0,
            max_ttl: record.ttl,
            max_ttl_key: record.key.clone(),
            sample_key: record.key.clone(),
        }
    }

    fn absorb(&mut self, record: &KeyRecord) {
        self.count += 1;

        self.total_memory += record.memory;
        if record.memory > self.max_memory {
            self.max_memory = record.memory;
        }

        self.total_size += record.size;
        if record.size > self.max_size {
            self.max_size = record.size;
        }

        self.total_ttl += record.ttl;
        // Ties move the argmax to the latest key
        if record.ttl >= self.max_ttl {
            self.max_ttl = record.ttl;
            self.max_ttl_key.clone_from(&record.key);
        }
    }

    /// Mean TTL (truncating); -1 for a NOTTL bucket
    pub fn avg_ttl(&self) -> i64 {
        self.total_ttl / self.count as i64
    }

    /// Mean memory per key (truncating)
    pub fn avg_memory(&self) -> u64 {
        self.total_memory / self.count
    }

    /// Mean size per key (truncating)
    pub fn avg_size(&self) -> u64 {
        self.total_size / self.count
    }

    /// Bucket identity
    pub fn bucket_key(&self) -> BucketKey {
        BucketKey {
            pattern: self.pattern.clone(),
            key_type: self.key_type,
            ttl: self.ttl,
        }
    }
}

/// Owner of the bucket map for a single run
#[derive(Debug, Default)]
pub struct Aggregator {
    buckets: HashMap<BucketKey, PatternStat>,
    folded: u64,
    excluded: u64,
}

impl Aggregator {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a whole record stream, stopping at the first error
    pub fn fold<I, E, F>(records: I, mut generalize: F) -> Result<Self, E>
    where
        I: IntoIterator<Item = Result<KeyRecord, E>>,
        F: FnMut(&str) -> String,
    {
        let mut aggregator = Self::new();
        for record in records {
            aggregator.observe(&record?, &mut generalize);
        }
        Ok(aggregator)
    }

    /// Fold one record; returns false when it was excluded
    pub fn observe<F>(&mut self, record: &KeyRecord, generalize: F) -> bool
    where
        F: FnOnce(&str) -> String,
    {
        let Some(ttl) = TtlCategory::classify(record.ttl) else {
            self.excluded += 1;
            return false;
        };

        let bucket = BucketKey {
            pattern: generalize(&record.key),
            key_type: record.key_type,
            ttl,
        };

        let stat = match self.buckets.entry(bucket) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let seeded = PatternStat::seed(entry.key(), record);
                entry.insert(seeded)
            }
        };
        stat.absorb(record);
        self.folded += 1;
        true
    }

    /// Records folded into some bucket
    pub fn folded(&self) -> u64 {
        self.folded
    }

    /// Records dropped because the key vanished mid-scan
    pub fn excluded(&self) -> u64 {
        self.excluded
    }

    /// Number of distinct buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// True when nothing has been folded
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Look up one bucket
    pub fn get(&self, key: &BucketKey) -> Option<&PatternStat> {
        self.buckets.get(key)
    }

    /// Iterate over buckets in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = &PatternStat> {
        self.buckets.values()
    }

    /// Consume the aggregator, yielding its buckets in arbitrary order
    pub fn into_stats(self) -> Vec<PatternStat> {
        self.buckets.into_values().collect()
    }
}
