//! Lazy, cursor-driven key enumeration
//!
//! `KeyScanner` pulls one batch at a time from a `BatchSource` and hands
//! records out one by one, so memory stays bounded by the batch size no
//! matter how large the keyspace is.

use crate::error::{StoreError, StoreResult};
use crate::scan::types::{KeyRecord, ScanBatch, ScanCursor};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Anything that can run the atomic "scan + collect metadata" step
pub trait BatchSource {
    /// Switch to the logical database to scan
    fn select_database(&mut self, db: u32) -> StoreResult<()>;

    /// Advance `cursor` by one batch, returning matched keys with their metadata
    fn fetch_batch(
        &mut self,
        cursor: ScanCursor,
        match_glob: &str,
        batch_size: usize,
    ) -> StoreResult<ScanBatch>;
}

impl<S: BatchSource + ?Sized> BatchSource for &mut S {
    fn select_database(&mut self, db: u32) -> StoreResult<()> {
        (**self).select_database(db)
    }

    fn fetch_batch(
        &mut self,
        cursor: ScanCursor,
        match_glob: &str,
        batch_size: usize,
    ) -> StoreResult<ScanBatch> {
        (**self).fetch_batch(cursor, match_glob, batch_size)
    }
}

/// Parameters for one enumeration
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Logical database index
    pub database: u32,

    /// Glob passed to SCAN MATCH
    pub match_glob: String,

    /// COUNT hint for each SCAN
    pub batch_size: usize,

    /// Stop after this many records (unbounded if not set)
    pub limit: Option<u64>,

    /// Pause between batch fetches
    pub delay: Option<Duration>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            database: 0,
            match_glob: "*".to_string(),
            batch_size: 1000,
            limit: None,
            delay: None,
        }
    }
}

/// Pull-based iterator over key records
pub struct KeyScanner<S> {
    source: S,
    options: ScanOptions,
    cursor: ScanCursor,
    buffer: VecDeque<KeyRecord>,
    selected: bool,
    exhausted: bool,
    interrupted: bool,
    batches: u64,
    emitted: u64,
    shutdown: Option<Arc<AtomicBool>>,
}

impl<S: BatchSource> KeyScanner<S> {
    /// Create a scanner; no I/O happens until the first record is pulled
    pub fn new(source: S, options: ScanOptions) -> Self {
        Self {
            source,
            options,
            cursor: ScanCursor::START,
            buffer: VecDeque::new(),
            selected: false,
            exhausted: false,
            interrupted: false,
            batches: 0,
            emitted: 0,
            shutdown: None,
        }
    }

    /// Stop fetching further batches once `flag` is raised
    pub fn with_shutdown(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown = Some(flag);
        self
    }

    /// Number of batches fetched so far
    pub fn batches(&self) -> u64 {
        self.batches
    }

    /// Number of records handed out so far
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// True when the shutdown flag cut the scan short
    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    /// True once the server cursor wrapped back to the start
    pub fn is_complete(&self) -> bool {
        self.exhausted && !self.interrupted && self.cursor.is_start()
    }

    fn limit_reached(&self) -> bool {
        matches!(self.options.limit, Some(limit) if self.emitted >= limit)
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    fn fetch_next(&mut self) -> StoreResult<()> {
        if !self.selected {
            self.source.select_database(self.options.database)?;
            self.selected = true;
        }

        if self.batches > 0 {
            if let Some(delay) = self.options.delay {
                thread::sleep(delay);
            }
        }

        let batch = self.source.fetch_batch(
            self.cursor,
            &self.options.match_glob,
            self.options.batch_size,
        )?;
        self.batches += 1;

        debug!(
            batch = self.batches,
            cursor = %self.cursor,
            next_cursor = %batch.next_cursor,
            keys = batch.records.len(),
            "Fetched batch"
        );

        self.cursor = batch.next_cursor;
        if self.cursor.is_start() {
            self.exhausted = true;
        }
        self.buffer.extend(batch.records);
        Ok(())
    }
}

impl<S: BatchSource> Iterator for KeyScanner<S> {
    type Item = Result<KeyRecord, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.limit_reached() {
                self.buffer.clear();
                self.exhausted = true;
                return None;
            }

            if let Some(record) = self.buffer.pop_front() {
                self.emitted += 1;
                return Some(Ok(record));
            }

            if self.exhausted {
                return None;
            }

            if self.shutdown_requested() {
                info!(batches = self.batches, keys = self.emitted, "Scan interrupted");
                self.interrupted = true;
                self.exhausted = true;
                return None;
            }

            if let Err(e) = self.fetch_next() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
    }
}
