//! The scan pipeline: read entries, decode each one, report it.

use std::fmt;
use std::io::Write;

use tracing::{debug, info, warn};

use crate::decoder::{RecentEntryDecoder, Resolution};
use crate::error::Result;
use crate::registry::RegistryReader;
use crate::report::Reporter;

/// Per-run totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Entries read from the registry.
    pub entries: usize,
    /// Entries whose file metadata was read.
    pub resolved: usize,
    /// Entries whose file no longer exists.
    pub deleted: usize,
    /// Entries failing the structure check.
    pub invalid: usize,
    /// Entries that failed with an unexpected error.
    pub failed: usize,
}

impl ScanSummary {
    fn record(&mut self, resolution: &Resolution) {
        match resolution {
            Resolution::Invalid => self.invalid += 1,
            Resolution::Deleted { .. } => self.deleted += 1,
            Resolution::Found(_) => self.resolved += 1,
        }
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries: {} resolved, {} deleted, {} invalid, {} failed",
            self.entries, self.resolved, self.deleted, self.invalid, self.failed
        )
    }
}

/// Decode and report every entry `reader` yields, in order.
///
/// A failure on one entry is logged, counted and reported with its error;
/// the run moves on to the next entry.
///
/// # Errors
///
/// Returns an error if the registry cannot be read or the report cannot be
/// written.
pub fn run<W: Write>(
    reader: &dyn RegistryReader,
    decoder: &RecentEntryDecoder,
    reporter: &mut Reporter<W>,
) -> Result<ScanSummary> {
    let entries = reader.read_entries()?;
    info!(count = entries.len(), "Scanning recent entries");

    let mut summary = ScanSummary {
        entries: entries.len(),
        ..ScanSummary::default()
    };

    for entry in &entries {
        match decoder.decode(entry) {
            Ok(decoded) => {
                debug!(entry = %entry.name, resolution = %decoded.resolution, "Decoded entry");
                summary.record(&decoded.resolution);
                reporter.write_entry(&decoded)?;
            }
            Err(err) => {
                warn!(entry = %entry.name, error = %err, "Failed to decode entry");
                summary.failed += 1;
                reporter.write_failure(entry, &err)?;
            }
        }
    }

    info!(%summary, "Scan finished");
    Ok(summary)
}
