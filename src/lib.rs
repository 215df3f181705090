//! rm-dupes - duplicate file finder
//!
//! Finds files with identical content under one or more directories by
//! grouping on size and then on a BLAKE3 content hash. The resulting
//! duplicate sets can be summarised, pruned to one file each, or pruned with
//! each removed file replaced by a symbolic link to the one kept.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use std::io::{self, Write};

use anyhow::Context;

use crate::actions::{ActionExecutor, ActionReport, FirstMember, StdinPrompt};
use crate::cli::Cli;
use crate::config::{Action, Settings};
use crate::duplicates::{DuplicateFinder, DuplicateSetRegistry, ScanSummary};
use crate::error::ExitCode;
use crate::output::text::{write_action_report, write_sets, write_summary};
use crate::output::JsonReport;
use crate::progress::{ConsoleSink, QuietSink, ScanEventSink};
use crate::signal::ShutdownHandler;

/// Run the application with parsed arguments, writing results to stdout.
///
/// # Errors
///
/// Returns an error for invalid configuration, an unusable root, an
/// interrupted scan or a failed write to stdout.
pub fn run_app(cli: Cli) -> anyhow::Result<ExitCode> {
    let handler = signal::install_handler().unwrap_or_else(|e| {
        log::warn!("{}; Ctrl+C will terminate immediately", e);
        ShutdownHandler::new()
    });
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with(&cli, &handler, &mut out)
}

/// Run with an explicit shutdown handler and output writer.
///
/// # Errors
///
/// See [`run_app`].
pub fn run_with<W: Write>(
    cli: &Cli,
    handler: &ShutdownHandler,
    out: &mut W,
) -> anyhow::Result<ExitCode> {
    let settings = Settings::load();
    let scan_config = cli.scan_configuration(&settings)?;
    let action_config = cli.action_configuration(&settings)?;
    log::debug!("Scan configuration: {:?}", scan_config);
    log::debug!("Action configuration: {:?}", action_config);

    if cli.save_settings {
        let path = cli
            .effective_settings(&settings)?
            .save()
            .context("Failed to save settings")?;
        log::info!("Saved settings to {}", path.display());
    }

    let sink: Box<dyn ScanEventSink> = if cli.quiet {
        Box::new(QuietSink)
    } else {
        Box::new(ConsoleSink::new(cli.json))
    };

    let finder = DuplicateFinder::new(scan_config).with_shutdown_flag(handler.get_flag());
    let (mut registry, summary) = finder.scan(&cli.roots, sink.as_ref())?;
    if let Some(order) = cli.set_order() {
        registry.sort_sets(order);
    }
    log::info!(
        "Found {} duplicate sets ({} reclaimable)",
        registry.set_count(),
        summary.reclaimable_display()
    );

    let interactive = action_config.action.is_destructive() && !action_config.no_prompt;
    if !cli.json && !interactive {
        write_sets(out, &registry, cli.listing_options()).context("Failed to write listing")?;
    }
    if !cli.json && action_config.action == Action::Summary {
        write_summary(out, &summary).context("Failed to write summary")?;
    }

    let executor = ActionExecutor::new(action_config).with_shutdown_flag(handler.get_flag());
    let report = if interactive {
        if cli.json {
            let mut prompt = StdinPrompt::new(io::stdin().lock(), io::stderr());
            executor.execute(&registry, &mut prompt)
        } else {
            executor.execute(&registry, &mut StdinPrompt::stdio())
        }
    } else {
        executor.execute(&registry, &mut FirstMember)
    };

    let code = exit_code_for(&registry, &summary, &report);

    if action_config.action.is_destructive() {
        if cli.json {
            write_action_report(&mut io::stderr(), action_config.action, &report)
                .context("Failed to write action report")?;
        } else {
            write_action_report(out, action_config.action, &report)
                .context("Failed to write action report")?;
        }
    }

    if cli.json {
        JsonReport::new(&registry, &summary, code, cli.reverse)
            .write_to(out)
            .context("Failed to write JSON report")?;
    }

    out.flush()?;
    Ok(code)
}

/// Pick the exit code for a finished run.
///
/// Data loss outranks an interrupted action, which outranks partial
/// failures; an empty result is reported separately from success.
#[must_use]
pub fn exit_code_for(
    registry: &DuplicateSetRegistry,
    summary: &ScanSummary,
    report: &ActionReport,
) -> ExitCode {
    if report.data_loss_count() > 0 {
        ExitCode::DataLossRisk
    } else if report.interrupted {
        ExitCode::Interrupted
    } else if report.failure_count() > 0 || summary.errors > 0 {
        ExitCode::PartialSuccess
    } else if registry.is_empty() {
        ExitCode::NoDuplicates
    } else {
        ExitCode::Success
    }
}
