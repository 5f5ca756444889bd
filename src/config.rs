//! Configuration types for redis-key-analyzer
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::pattern::{PatternRules, Separator};
use crate::scan::ScanOptions;
use crate::store::StoreAddress;
use clap::{Parser, ValueEnum};
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;

/// Batch size limits
const MIN_BATCH_SIZE: usize = 1;
const MAX_BATCH_SIZE: usize = 100_000;

/// Splits the `--prefix` list
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

/// Redis key pattern analyzer
#[derive(Parser, Debug, Clone)]
#[command(
    name = "rka",
    version,
    about = "Scan a Redis keyspace and summarize memory, size and TTL per key pattern",
    long_about = "Scans a Redis database with SCAN, fetching type, TTL, memory usage and size\n\
                  for every key in one atomic script call per batch, then groups keys into\n\
                  patterns (user:123 -> user:<*>) and reports totals per pattern.\n\n\
                  The scan never writes to the server. Use --read-only to refuse to run\n\
                  against anything but a replica.",
    after_help = "EXAMPLES:\n    \
        rka --host 10.0.0.5 --read-only\n    \
        rka -m 'session:*' --batch-size 500 --sleep 0.05\n    \
        rka --prefix 'user: order:' --separator ':' --separator-max-depth 2\n    \
        rka --no-separator --limit 100000 --format json"
)]
pub struct CliArgs {
    /// Redis host
    #[arg(long, env = "REDIS_HOST", default_value = "localhost")]
    pub host: String,

    /// Redis port
    #[arg(long, env = "REDIS_PORT", default_value_t = 6379)]
    pub port: u16,

    /// Redis database index
    #[arg(long, default_value_t = 0, value_name = "NUM")]
    pub db: u32,

    /// Refuse to scan unless the server reports itself as a replica
    #[arg(long = "read-only", visible_alias = "ro")]
    pub read_only: bool,

    /// Glob passed to SCAN MATCH
    #[arg(short = 'm', long = "match", default_value = "*", value_name = "GLOB")]
    pub match_glob: String,

    /// Keys requested per SCAN call
    #[arg(long, default_value_t = 1000, value_name = "NUM")]
    pub batch_size: usize,

    /// Explicit key prefixes, whitespace separated (e.g. 'user: order:')
    #[arg(long, value_name = "PREFIXES")]
    pub prefix: Option<String>,

    /// Separator for pattern heads
    #[arg(long, default_value = ":", value_name = "SEP")]
    pub separator: String,

    /// Disable the separator rule
    #[arg(long, conflicts_with = "separator")]
    pub no_separator: bool,

    /// Number of separator occurrences kept in a pattern head
    #[arg(long, default_value_t = 1, value_name = "NUM")]
    pub separator_max_depth: usize,

    /// Stop after this many keys (-1 for no limit)
    #[arg(long, default_value_t = -1, allow_negative_numbers = true, value_name = "NUM")]
    pub limit: i64,

    /// Seconds to sleep between batches (-1 for no sleep)
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true, value_name = "SECS")]
    pub sleep: f64,

    /// Only show the first N rows of the report
    #[arg(long, value_name = "NUM")]
    pub top: Option<usize>,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Quiet mode - suppress header, progress and summary
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (per-batch debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Output format for the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Bordered text table
    Table,
    /// JSON array of rows
    Json,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct AnalyzeConfig {
    /// Server to connect to
    pub address: StoreAddress,

    /// Enumeration parameters
    pub scan: ScanOptions,

    /// Pattern generalization rules
    pub rules: PatternRules,

    /// Abort unless the server is a replica
    pub read_only: bool,

    /// Truncate the report to this many rows
    pub top: Option<usize>,

    /// Report format
    pub output_format: OutputFormat,

    /// Show header, progress and summary
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl AnalyzeConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        if args.port == 0 {
            return Err(ConfigError::InvalidPort { port: args.port });
        }

        if args.batch_size < MIN_BATCH_SIZE || args.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize {
                size: args.batch_size,
                min: MIN_BATCH_SIZE,
                max: MAX_BATCH_SIZE,
            });
        }

        if args.match_glob.is_empty() {
            return Err(ConfigError::EmptyMatchPattern);
        }

        let separator = if args.no_separator {
            None
        } else {
            Some(Separator::new(args.separator, args.separator_max_depth)?)
        };

        let prefixes = args.prefix.as_deref().map(split_prefixes).unwrap_or_default();

        let delay = parse_delay(args.sleep)?;
        let limit = u64::try_from(args.limit).ok().filter(|&n| n > 0);

        Ok(Self {
            address: StoreAddress {
                host: args.host,
                port: args.port,
            },
            scan: ScanOptions {
                database: args.db,
                match_glob: args.match_glob,
                batch_size: args.batch_size,
                limit,
                delay,
            },
            rules: PatternRules::new(prefixes, separator),
            read_only: args.read_only,
            top: args.top,
            output_format: args.format,
            show_progress: !args.quiet,
            verbose: args.verbose,
        })
    }

    /// `host:port/db` for display
    pub fn target_display(&self) -> String {
        format!(
            "{}:{}/{}",
            self.address.host, self.address.port, self.scan.database
        )
    }
}

/// Split a whitespace-separated prefix list, dropping empty entries
pub fn split_prefixes(list: &str) -> Vec<String> {
    WHITESPACE
        .split(list.trim())
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Non-positive values mean "no delay"
fn parse_delay(seconds: f64) -> Result<Option<Duration>, ConfigError> {
    if !seconds.is_finite() {
        return Err(ConfigError::InvalidSleep {
            value: seconds.to_string(),
        });
    }
    if seconds <= 0.0 {
        return Ok(None);
    }
    Ok(Some(Duration::from_secs_f64(seconds)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        let mut argv = vec!["rka"];
        argv.extend_from_slice(args);
        CliArgs::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AnalyzeConfig::from_args(parse(&[])).unwrap();
        assert_eq!(config.scan.database, 0);
        assert_eq!(config.scan.match_glob, "*");
        assert_eq!(config.scan.batch_size, 1000);
        assert_eq!(config.scan.limit, None);
        assert_eq!(config.scan.delay, None);
        assert!(config.rules.prefixes().is_empty());
        assert_eq!(config.rules.separator().unwrap().token(), ":");
        assert_eq!(config.rules.separator().unwrap().max_depth(), 1);
        assert!(!config.read_only);
        assert_eq!(config.output_format, OutputFormat::Table);
    }

    #[test]
    fn test_split_prefixes() {
        assert_eq!(split_prefixes("user: order:"), vec!["user:", "order:"]);
        assert_eq!(split_prefixes("  a\t b\n"), vec!["a", "b"]);
        assert!(split_prefixes("   ").is_empty());
    }

    #[test]
    fn test_full_args() {
        let config = AnalyzeConfig::from_args(parse(&[
            "--host",
            "10.0.0.9",
            "--port",
            "6380",
            "--db",
            "2",
            "--ro",
            "-m",
            "cache:*",
            "--batch-size",
            "250",
            "--prefix",
            "cache:hot cache:",
            "--separator",
            "/",
            "--separator-max-depth",
            "3",
            "--limit",
            "5000",
            "--sleep",
            "0.25",
            "--top",
            "10",
            "--format",
            "json",
        ]))
        .unwrap();

        assert_eq!(config.target_display(), "10.0.0.9:6380/2");
        assert!(config.read_only);
        assert_eq!(config.scan.match_glob, "cache:*");
        assert_eq!(config.scan.batch_size, 250);
        assert_eq!(config.scan.limit, Some(5000));
        assert_eq!(config.scan.delay, Some(Duration::from_millis(250)));
        assert_eq!(config.rules.prefixes(), ["cache:hot", "cache:"]);
        assert_eq!(config.rules.separator().unwrap().token(), "/");
        assert_eq!(config.rules.separator().unwrap().max_depth(), 3);
        assert_eq!(config.top, Some(10));
        assert_eq!(config.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_negative_limit_and_sleep() {
        let config =
            AnalyzeConfig::from_args(parse(&["--limit", "-1", "--sleep", "-1"])).unwrap();
        assert_eq!(config.scan.limit, None);
        assert_eq!(config.scan.delay, None);

        let config = AnalyzeConfig::from_args(parse(&["--limit", "0"])).unwrap();
        assert_eq!(config.scan.limit, None);
    }

    #[test]
    fn test_no_separator() {
        let config = AnalyzeConfig::from_args(parse(&["--no-separator"])).unwrap();
        assert!(config.rules.separator().is_none());
    }

    #[test]
    fn test_invalid_values() {
        let err = AnalyzeConfig::from_args(parse(&["--batch-size", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBatchSize { size: 0, .. }));

        let err = AnalyzeConfig::from_args(parse(&["--separator", ""])).unwrap_err();
        assert_eq!(err, ConfigError::EmptySeparator);

        let err =
            AnalyzeConfig::from_args(parse(&["--separator-max-depth", "0"])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidSeparatorDepth { depth: 0 });

        let err = AnalyzeConfig::from_args(parse(&["-m", ""])).unwrap_err();
        assert_eq!(err, ConfigError::EmptyMatchPattern);

        let err = AnalyzeConfig::from_args(parse(&["--port", "0"])).unwrap_err();
        assert_eq!(err, ConfigError::InvalidPort { port: 0 });
    }

    #[test]
    fn test_parse_delay() {
        assert_eq!(parse_delay(0.0).unwrap(), None);
        assert_eq!(parse_delay(-0.5).unwrap(), None);
        assert_eq!(parse_delay(2.0).unwrap(), Some(Duration::from_secs(2)));
        assert!(parse_delay(f64::NAN).is_err());
        assert!(parse_delay(f64::INFINITY).is_err());
    }
}
