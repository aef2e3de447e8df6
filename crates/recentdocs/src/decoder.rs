//! Decoding of recent entries into paths and metadata.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::error::Result;
use crate::metadata::{Metadata, MetadataResolver};
use crate::pidl::{self, PidlPathResolver};
use crate::registry::RecentEntry;

/// Marker printed for entries that fail the structure check.
pub const INVALID_FORMAT: &str = "INVALID_FORMAT";

/// Marker printed for entries whose file no longer exists.
pub const FILE_DELETED: &str = "File deleted. No metadata available.";

/// What decoding an entry produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The value's first byte did not declare a 20-byte root item.
    Invalid,
    /// The path decoded but the file is gone.
    Deleted {
        /// The decoded path.
        path: PathBuf,
    },
    /// The file exists and its metadata was read.
    Found(Metadata),
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str(INVALID_FORMAT),
            Self::Deleted { path } => write!(f, "{} ({FILE_DELETED})", path.display()),
            Self::Found(meta) => write!(f, "{}", meta.path.display()),
        }
    }
}

/// A recent entry together with what it decoded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedRecent<'a> {
    /// The registry record this was decoded from.
    pub source: &'a RecentEntry,
    /// The decoding outcome.
    pub resolution: Resolution,
}

impl DecodedRecent<'_> {
    /// The decoded path, unless the entry is invalid.
    #[must_use]
    pub fn resolved_path(&self) -> Option<&Path> {
        match &self.resolution {
            Resolution::Invalid => None,
            Resolution::Deleted { path } => Some(path),
            Resolution::Found(meta) => Some(&meta.path),
        }
    }

    /// The file's metadata, if it was found.
    #[must_use]
    pub fn metadata(&self) -> Option<&Metadata> {
        match &self.resolution {
            Resolution::Found(meta) => Some(meta),
            _ => None,
        }
    }

    /// Whether the entry failed the structure check.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.resolution == Resolution::Invalid
    }
}

/// Validates and decodes recent entries.
#[derive(Debug)]
pub struct RecentEntryDecoder {
    paths: Box<dyn PidlPathResolver>,
    metadata: MetadataResolver,
}

impl RecentEntryDecoder {
    /// Create a decoder from a path resolver and a metadata resolver.
    #[must_use]
    pub fn new(paths: Box<dyn PidlPathResolver>, metadata: MetadataResolver) -> Self {
        Self { paths, metadata }
    }

    /// Decode one entry.
    ///
    /// Entries failing the first-byte structure check come back as
    /// [`Resolution::Invalid`] and nothing else is attempted. A file that
    /// no longer exists is [`Resolution::Deleted`], not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the id list cannot be turned into a path or the
    /// file's attributes or owner cannot be read for a reason other than the
    /// file being gone. The error concerns this entry only.
    pub fn decode<'a>(&self, entry: &'a RecentEntry) -> Result<DecodedRecent<'a>> {
        if !pidl::has_valid_structure(&entry.data) {
            debug!(
                entry = %entry.name,
                declared = ?pidl::declared_size(&entry.data),
                "Structure check failed"
            );
            return Ok(DecodedRecent {
                source: entry,
                resolution: Resolution::Invalid,
            });
        }

        let path = self.paths.resolve_path(&entry.data)?;
        trace!(entry = %entry.name, path = %path.display(), "Decoded path");

        let resolution = match self.metadata.resolve(&path) {
            Ok(meta) => Resolution::Found(meta),
            Err(err) if err.is_not_found() => {
                debug!(entry = %entry.name, path = %path.display(), "File deleted");
                Resolution::Deleted { path }
            }
            Err(err) => return Err(err),
        };

        Ok(DecodedRecent {
            source: entry,
            resolution,
        })
    }
}
