//! rka - Redis key pattern analyzer
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use redis_key_analyzer::config::{AnalyzeConfig, CliArgs, OutputFormat};
use redis_key_analyzer::coordinator::{AnalyzeCoordinator, AnalyzeOutcome};
use redis_key_analyzer::progress::{print_header, print_summary, ProgressReporter};
use redis_key_analyzer::report::{JsonSink, ReportSink, TableSink};
use redis_key_analyzer::Report;
use std::io;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Exit code when the read-only gate refuses the server
const EXIT_NOT_REPLICA: u8 = 1;

/// Exit code for every other failure
const EXIT_FAILURE: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run() -> Result<ExitCode> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = AnalyzeConfig::from_args(args).context("Invalid configuration")?;

    if config.show_progress {
        print_header(&config);
    }

    let coordinator = AnalyzeCoordinator::new(config.clone());
    install_interrupt_handler(coordinator.shutdown_flag())?;

    let progress = if config.show_progress {
        Some(ProgressReporter::new())
    } else {
        None
    };

    let outcome = coordinator.run(progress.as_ref());

    let result = match outcome {
        Ok(AnalyzeOutcome::Completed(result)) => result,
        Ok(AnalyzeOutcome::Aborted { role }) => {
            if let Some(ref p) = progress {
                p.finish_and_clear();
            }
            eprintln!(
                "Refusing to scan {}: server role is '{}', --read-only requires a replica",
                config.target_display(),
                role
            );
            return Ok(ExitCode::from(EXIT_NOT_REPLICA));
        }
        Err(e) => {
            if let Some(ref p) = progress {
                p.finish_and_clear();
            }
            return Err(e).context("Analysis failed");
        }
    };

    if let Some(ref p) = progress {
        if result.completed {
            p.finish("Scan completed");
        } else {
            p.finish("Scan interrupted");
        }
    }

    write_report(&result.report, config.output_format).context("Failed to write report")?;

    if config.show_progress {
        print_summary(&result);
    }

    if !result.completed {
        info!("Scan was interrupted before completion; report is partial");
    }

    Ok(ExitCode::SUCCESS)
}

/// First Ctrl+C stops after the current batch, a second one exits at once
fn install_interrupt_handler(shutdown: Arc<AtomicBool>) -> Result<()> {
    let ctrl_c_count = AtomicU32::new(0);
    ctrlc::set_handler(move || {
        let count = ctrl_c_count.fetch_add(1, Ordering::SeqCst);
        if count == 0 {
            eprintln!("\nInterrupt received, finishing current batch...");
            eprintln!("Press Ctrl+C again to force exit immediately.");
            shutdown.store(true, Ordering::SeqCst);
        } else {
            eprintln!("\nForced exit!");
            std::process::exit(130);
        }
    })
    .context("Failed to set signal handler")
}

fn write_report(report: &Report, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout().lock();
    match format {
        OutputFormat::Table => TableSink::new(stdout).render(report)?,
        OutputFormat::Json => JsonSink::new(stdout, true).render(report)?,
    }
    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("redis_key_analyzer=debug,warn")
    } else {
        EnvFilter::new("redis_key_analyzer=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
