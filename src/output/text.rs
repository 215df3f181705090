//! Plain-text listing of duplicate sets, the scan summary and action results.

use std::io::{self, Write};
use std::time::SystemTime;

use bytesize::ByteSize;
use chrono::{DateTime, Local};
use yansi::Paint;

use crate::actions::ActionReport;
use crate::config::Action;
use crate::duplicates::{DuplicateSetRegistry, ScanSummary};
use crate::scanner::FileRecord;

/// What to include in a set listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListingOptions {
    /// Append each member's size
    pub show_size: bool,
    /// Append each member's last-write time
    pub show_time: bool,
    /// List sets back to front
    pub reverse: bool,
}

/// Write every set with its members.
///
/// Sets keep their forward number when listed in reverse.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_sets<W: Write>(
    w: &mut W,
    registry: &DuplicateSetRegistry,
    options: ListingOptions,
) -> io::Result<()> {
    let numbered = registry.iter().enumerate();
    let sets: Box<dyn Iterator<Item = _>> = if options.reverse {
        Box::new(numbered.rev())
    } else {
        Box::new(numbered)
    };

    for (idx, set) in sets {
        writeln!(w, "Set {}", idx + 1)?;
        for member in set.members() {
            writeln!(w, " {}", member_line(member, options))?;
        }
    }
    Ok(())
}

fn member_line(member: &FileRecord, options: ListingOptions) -> String {
    let mut line = member.path.display().to_string();
    if options.show_size {
        line.push_str(&format!("  [{}]", ByteSize::b(member.size)));
    }
    if options.show_time {
        line.push_str(&format!("  [{}]", format_time(member.modified)));
    }
    line
}

/// Format a timestamp in local time, or `-` if unknown.
#[must_use]
pub fn format_time(time: Option<SystemTime>) -> String {
    match time {
        Some(t) => DateTime::<Local>::from(t)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => "-".to_string(),
    }
}

/// Write the end-of-scan summary block.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_summary<W: Write>(w: &mut W, summary: &ScanSummary) -> io::Result<()> {
    writeln!(w)?;
    writeln!(w, "Scan completed:-")?;
    writeln!(w, "  Files examined:        {}", summary.files_examined)?;
    writeln!(w, "  Duplicate files found: {}", summary.duplicate_files)?;
    writeln!(w, "  Duplicate sets found:  {}", summary.duplicate_sets)?;
    writeln!(w, "  Space occupied:        {} bytes.", summary.space_occupied)?;
    Ok(())
}

/// Write the outcome of a delete or link run.
///
/// Data loss risks are listed first and highlighted.
///
/// # Errors
///
/// Returns any error from the writer.
pub fn write_action_report<W: Write>(
    w: &mut W,
    action: Action,
    report: &ActionReport,
) -> io::Result<()> {
    if !report.data_loss.is_empty() {
        writeln!(w)?;
        writeln!(
            w,
            "{}",
            "WARNING: the following files were removed but could not be linked:"
                .red()
                .bold()
        )?;
        for error in &report.data_loss {
            writeln!(w, "  {}", error.red())?;
        }
    }

    if !report.failures.is_empty() {
        writeln!(w)?;
        writeln!(w, "{}", "Failures:".yellow().bold())?;
        for error in &report.failures {
            writeln!(w, "  {}", error)?;
        }
    }

    writeln!(w)?;
    let verb = match action {
        Action::Link => "Linked",
        Action::Delete | Action::Summary => "Removed",
    };
    writeln!(
        w,
        "{} {} files in {} sets, {} reclaimed.",
        verb,
        report.success_count(),
        report.sets_processed,
        ByteSize::b(report.bytes_reclaimed)
    )?;
    if report.interrupted {
        writeln!(w, "{}", "Interrupted before all sets were processed.".yellow())?;
    }
    Ok(())
}
