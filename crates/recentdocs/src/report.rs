//! Plain-text report output.
//!
//! Each decoded entry becomes one block on the writer:
//!
//! ```text
//! Value: docx\0
//!     File: C:\Users\X\doc.docx
//!     SID: S-1-5-21-...-1001
//!     Owner: WORKSTATION\X
//!     File Size: 1024
//!     Modified: 2024-01-01T00:00:00
//!     Accessed: 2024-01-01T00:00:00
//!     Created: 2024-01-01T00:00:00
//! ```

use std::io::Write;

use chrono::{DateTime, Utc};

use crate::config::{ReportConfig, DEFAULT_TIME_FORMAT};
use crate::decoder::{DecodedRecent, Resolution, FILE_DELETED, INVALID_FORMAT};
use crate::error::{Error, Result};
use crate::pidl;
use crate::registry::RecentEntry;
use crate::scan::ScanSummary;

const INDENT: &str = "    ";

/// What the report includes and how timestamps look.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportOptions {
    /// Print blocks for entries failing the structure check.
    pub show_invalid: bool,
    /// strftime format applied to UTC timestamps.
    pub time_format: String,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            show_invalid: true,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }
}

impl From<&ReportConfig> for ReportOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            show_invalid: config.show_invalid,
            time_format: config.time_format.clone(),
        }
    }
}

/// Writes report blocks to any [`Write`] sink.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    options: ReportOptions,
}

impl<W: Write> Reporter<W> {
    /// Create a reporter writing to `out`.
    pub fn new(out: W, options: ReportOptions) -> Self {
        Self { out, options }
    }

    /// Print the block for one decoded entry.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_entry(&mut self, decoded: &DecodedRecent<'_>) -> Result<()> {
        if decoded.is_invalid() && !self.options.show_invalid {
            return Ok(());
        }

        writeln!(self.out, "Value: {}", decoded.source.name)?;
        match &decoded.resolution {
            Resolution::Invalid => {
                writeln!(self.out, "{INDENT}File: {INVALID_FORMAT}")?;
            }
            Resolution::Deleted { path } => {
                writeln!(self.out, "{INDENT}File: {}", path.display())?;
                writeln!(self.out, "{INDENT}{FILE_DELETED}")?;
            }
            Resolution::Found(meta) => {
                writeln!(self.out, "{INDENT}File: {}", meta.path.display())?;
                writeln!(self.out, "{INDENT}SID: {}", meta.sid)?;
                writeln!(self.out, "{INDENT}Owner: {}", meta.owner)?;
                writeln!(self.out, "{INDENT}File Size: {}", meta.size_bytes)?;
                writeln!(self.out, "{INDENT}Modified: {}", self.time(meta.modified_at))?;
                writeln!(self.out, "{INDENT}Accessed: {}", self.time(meta.accessed_at))?;
                writeln!(self.out, "{INDENT}Created: {}", self.time(meta.created_at))?;
            }
        }
        writeln!(self.out)?;
        Ok(())
    }

    /// Print the block for an entry that could not be decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_failure(&mut self, entry: &RecentEntry, error: &Error) -> Result<()> {
        writeln!(self.out, "Value: {}", entry.name)?;
        writeln!(self.out, "{INDENT}Error: {error}")?;
        writeln!(self.out)?;
        Ok(())
    }

    /// Print the totals line.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_summary(&mut self, summary: &ScanSummary) -> Result<()> {
        writeln!(self.out, "{summary}")?;
        Ok(())
    }

    /// Print a structural breakdown of one id list.
    ///
    /// Parse failures are part of the output rather than errors, since the
    /// point is to look at lists that may be broken.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_inspection(&mut self, data: &[u8]) -> Result<()> {
        let verdict = if pidl::has_valid_structure(data) {
            "valid"
        } else {
            INVALID_FORMAT
        };
        match pidl::declared_size(data) {
            Some(size) => writeln!(self.out, "Structure size: {size} ({verdict})")?,
            None => writeln!(self.out, "Structure size: none ({verdict})")?,
        }
        writeln!(self.out, "Length: {} bytes", data.len())?;

        match pidl::items(data) {
            Ok(items) => {
                writeln!(self.out, "Items: {}", items.len())?;
                for (index, item) in items.iter().enumerate() {
                    writeln!(
                        self.out,
                        "{INDENT}[{index}] offset {:>4}  size {:>4}  {}",
                        item.offset,
                        item.size(),
                        item.kind()
                    )?;
                }
            }
            Err(err) => writeln!(self.out, "Items: error: {err}")?,
        }

        match pidl::decode_path(data) {
            Ok(path) => writeln!(self.out, "Path: {path}")?,
            Err(err) => writeln!(self.out, "Path: error: {err}")?,
        }
        Ok(())
    }

    /// Flush and return the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns an error if flushing fails.
    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }

    fn time(&self, at: DateTime<Utc>) -> String {
        at.format(&self.options.time_format).to_string()
    }
}
