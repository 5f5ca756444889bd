//! Progress reporting for the key scan
//!
//! Provides real-time progress display using indicatif progress bars.

use crate::config::AnalyzeConfig;
use crate::coordinator::AnalyzeResult;
use crate::report::readable_bytes;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Progress reporter that displays scan status
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// Create a spinner; call `set_total` once the key count is known
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress template")
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Switch to a bounded bar over `total` keys
    pub fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {human_pos}/{human_len} keys ({per_sec}) {msg}",
                )
                .expect("Invalid progress template")
                .progress_chars("=> "),
        );
    }

    /// Count one scanned key
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        self.bar.set_message(status.to_string());
    }

    /// Finish the progress display with a final message
    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print a header at the start of the scan
pub fn print_header(config: &AnalyzeConfig) {
    let rules = &config.rules;
    let separator = match rules.separator() {
        Some(sep) => format!("'{}' (depth {})", sep.token(), sep.max_depth()),
        None => "none".to_string(),
    };
    let prefixes = if rules.prefixes().is_empty() {
        "none".to_string()
    } else {
        rules.prefixes().join(" ")
    };

    eprintln!();
    eprintln!(
        "{} {}",
        style("redis-key-analyzer").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Target:").bold(), config.target_display());
    eprintln!("  {} {}", style("Match:").bold(), config.scan.match_glob);
    eprintln!("  {} {}", style("Batch size:").bold(), config.scan.batch_size);
    eprintln!("  {} {}", style("Prefixes:").bold(), prefixes);
    eprintln!("  {} {}", style("Separator:").bold(), separator);
    if let Some(limit) = config.scan.limit {
        eprintln!("  {} {}", style("Limit:").bold(), format_number(limit));
    }
    if config.read_only {
        eprintln!("  {} replica required", style("Read-only:").bold());
    }
    eprintln!();
}

/// Print a summary of the scan
pub fn print_summary(result: &AnalyzeResult) {
    let duration_secs = result.duration.as_secs_f64();
    let rate = if duration_secs > 0.0 {
        result.scanned as f64 / duration_secs
    } else {
        0.0
    };

    let title = if result.completed {
        style("Scan Complete").green().bold()
    } else {
        style("Scan Stopped Early").yellow().bold()
    };

    eprintln!();
    eprintln!("{}", title);
    eprintln!("{}", style("─".repeat(50)).dim());
    eprintln!("  {} {}", style("Keys scanned:").bold(), format_number(result.scanned));
    eprintln!("  {} {}", style("Buckets:").bold(), format_number(result.buckets as u64));
    eprintln!(
        "  {} {}",
        style("Memory:").bold(),
        readable_bytes(result.total_memory)
    );
    eprintln!(
        "  {} {:.1}s ({:.0} keys/sec, {} batches)",
        style("Duration:").bold(),
        duration_secs,
        rate,
        format_number(result.batches)
    );
    if result.excluded > 0 {
        eprintln!(
            "  {} {}",
            style("Vanished mid-scan:").yellow().bold(),
            format_number(result.excluded)
        );
    }
    eprintln!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(1234567890), "1,234,567,890");
    }
}
