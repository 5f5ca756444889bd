//! Analyze coordinator - orchestrates one analysis run
//!
//! The coordinator is responsible for:
//! - Connecting to the server and enforcing the read-only gate
//! - Sizing the progress display from the keyspace
//! - Driving the scanner into the aggregator
//! - Building the final report and run statistics
//!
//! The scan/fold/report pipeline itself lives in [`analyze_source`], which
//! only needs a [`BatchSource`] and so runs just as well against an in-memory
//! source in tests.

use crate::analyze::Aggregator;
use crate::config::AnalyzeConfig;
use crate::error::{Result, StoreResult};
use crate::pattern::PatternRules;
use crate::progress::ProgressReporter;
use crate::report::{build_report, Report};
use crate::scan::{BatchSource, KeyRecord, KeyScanner, ScanOptions};
use crate::store::{RedisStore, ReplicationRole};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Statistics and report of a finished (or interrupted) run
#[derive(Debug, Clone)]
pub struct AnalyzeResult {
    /// Ordered report rows, already truncated to `--top`
    pub report: Report,

    /// Records pulled from the server
    pub scanned: u64,

    /// Records dropped because the key vanished mid-scan
    pub excluded: u64,

    /// Distinct (pattern, type, ttl) buckets before truncation
    pub buckets: usize,

    /// Memory summed over every bucket before truncation
    pub total_memory: u64,

    /// Batches fetched
    pub batches: u64,

    /// False when a shutdown request cut the scan short
    pub completed: bool,

    /// Wall time of the scan
    pub duration: Duration,
}

/// How a run ended
#[derive(Debug, Clone)]
pub enum AnalyzeOutcome {
    /// The read-only gate refused a server that is not a replica
    Aborted { role: ReplicationRole },

    /// The scan ran and produced a report
    Completed(AnalyzeResult),
}

/// Scan `source`, fold every record and build the report
///
/// `on_record` sees every record pulled, including ones the aggregator later
/// excludes. A store error aborts the run; a raised `shutdown` flag ends the
/// scan between batches and the partial result is returned with
/// `completed == false`.
pub fn analyze_source<S, F>(
    source: S,
    options: &ScanOptions,
    rules: &PatternRules,
    top: Option<usize>,
    shutdown: Option<Arc<AtomicBool>>,
    mut on_record: F,
) -> StoreResult<AnalyzeResult>
where
    S: BatchSource,
    F: FnMut(&KeyRecord),
{
    let start = Instant::now();

    let mut scanner = KeyScanner::new(source, options.clone());
    if let Some(flag) = shutdown {
        scanner = scanner.with_shutdown(flag);
    }

    let aggregator = Aggregator::fold(
        scanner.by_ref().inspect(|item| {
            if let Ok(record) = item {
                on_record(record);
            }
        }),
        |key| rules.generalize(key),
    )?;

    let scanned = scanner.emitted();
    let batches = scanner.batches();
    let completed = !scanner.interrupted();
    let excluded = aggregator.excluded();
    let buckets = aggregator.len();

    let stats = aggregator.into_stats();
    let total_memory = stats.iter().map(|s| s.total_memory).sum();
    let report = build_report(stats, top);

    let duration = start.elapsed();

    debug!(
        scanned,
        excluded,
        buckets,
        rows = report.len(),
        "Pipeline finished"
    );

    Ok(AnalyzeResult {
        report,
        scanned,
        excluded,
        buckets,
        total_memory,
        batches,
        completed,
        duration,
    })
}

/// Coordinates one analysis run against a live server
pub struct AnalyzeCoordinator {
    /// Configuration
    config: AnalyzeConfig,

    /// Shutdown signal
    shutdown: Arc<AtomicBool>,
}

impl AnalyzeCoordinator {
    /// Create a new coordinator; no connection is made until `run`
    pub fn new(config: AnalyzeConfig) -> Self {
        Self {
            config,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the shutdown flag (for signal handlers)
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Run the analysis
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<AnalyzeOutcome> {
        if let Some(p) = progress {
            p.set_status("Connecting to Redis...");
        }

        let mut store = RedisStore::connect(&self.config.address)?;
        info!(url = %store.url(), db = self.config.scan.database, "Connected");

        if self.config.read_only {
            let role = store.replication_role()?;
            if !role.is_replica() {
                warn!(role = %role, "Refusing to scan: server is not a replica");
                return Ok(AnalyzeOutcome::Aborted { role });
            }
            debug!(role = %role, "Read-only check passed");
        }

        let key_count = store.key_count(self.config.scan.database)?;
        info!(keys = key_count, "Total number of keys");

        if let Some(p) = progress {
            let total = match self.config.scan.limit {
                Some(limit) => limit.min(key_count),
                None => key_count,
            };
            if total > 0 {
                p.set_total(total);
            }
            p.set_status("Scanning...");
        }

        let result = analyze_source(
            &mut store,
            &self.config.scan,
            &self.config.rules,
            self.config.top,
            Some(self.shutdown_flag()),
            |_| {
                if let Some(p) = progress {
                    p.inc();
                }
            },
        )?;

        info!(
            scanned = result.scanned,
            buckets = result.buckets,
            excluded = result.excluded,
            duration_secs = result.duration.as_secs(),
            "Scan finished"
        );

        Ok(AnalyzeOutcome::Completed(result))
    }
}
