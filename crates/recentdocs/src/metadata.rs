//! File metadata and ownership resolution.
//!
//! [`MetadataResolver`] gathers size, timestamps and owner for a path through
//! two injected capabilities: [`FileStatProvider`] for filesystem attributes
//! and [`SecurityResolver`] for the owner SID and its account name.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// A security identifier in string form (`S-1-5-21-...`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sid(String);

impl Sid {
    /// Wrap a SID string.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// The SID string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An account name and its domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account name.
    pub name: String,
    /// Domain or machine name.
    pub domain: String,
}

/// Who owns a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// The owner SID maps to a known account.
    Resolved {
        /// Account name.
        name: String,
        /// Domain or machine name.
        domain: String,
    },
    /// No account could be found for the SID.
    Unresolved {
        /// The owner SID string.
        raw_sid: Sid,
    },
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved { name, domain } => write!(f, "{domain}\\{name}"),
            Self::Unresolved { raw_sid } => write!(f, "No Matching User for SID: {raw_sid}"),
        }
    }
}

/// Filesystem attributes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Size in bytes.
    pub size: u64,
    /// Last modification time.
    pub modified: DateTime<Utc>,
    /// Last access time.
    pub accessed: DateTime<Utc>,
    /// Creation time.
    pub created: DateTime<Utc>,
}

/// Reads filesystem attributes.
pub trait FileStatProvider: fmt::Debug {
    /// Stat `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if the path does not exist, or
    /// [`Error::Stat`] for any other failure.
    fn stat(&self, path: &Path) -> Result<FileStat>;
}

/// Queries file ownership.
pub trait SecurityResolver: fmt::Debug {
    /// Read the owner SID of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if the file disappeared, or
    /// [`Error::Security`] if the security descriptor cannot be read.
    fn owner_sid(&self, path: &Path) -> Result<Sid>;

    /// Translate a SID to the account it names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AccountLookup`] for orphaned SIDs or when no name
    /// service is reachable.
    fn lookup_account(&self, sid: &Sid) -> Result<Account>;
}

/// [`FileStatProvider`] backed by `std::fs::metadata`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileStat;

impl FileStatProvider for StdFileStat {
    fn stat(&self, path: &Path) -> Result<FileStat> {
        let meta = std::fs::metadata(path).map_err(|e| Error::stat(path, e))?;
        let modified = meta.modified().map_err(|e| Error::stat(path, e))?;
        let accessed = meta.accessed().map_err(|e| Error::stat(path, e))?;
        let created = created_at(&meta).map_err(|e| Error::stat(path, e))?;

        Ok(FileStat {
            size: meta.len(),
            modified: modified.into(),
            accessed: accessed.into(),
            created,
        })
    }
}

#[cfg(unix)]
fn created_at(meta: &std::fs::Metadata) -> std::io::Result<DateTime<Utc>> {
    use std::os::unix::fs::MetadataExt;

    if let Ok(created) = meta.created() {
        return Ok(created.into());
    }
    // No birth time on this filesystem: report the inode change time.
    let nanos = u32::try_from(meta.ctime_nsec()).unwrap_or(0);
    DateTime::from_timestamp(meta.ctime(), nanos).ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, "ctime out of range")
    })
}

#[cfg(not(unix))]
fn created_at(meta: &std::fs::Metadata) -> std::io::Result<DateTime<Utc>> {
    meta.created().map(Into::into)
}

/// Everything known about a file referenced by a recent entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// The file's path.
    pub path: PathBuf,
    /// Owner SID.
    pub sid: Sid,
    /// Owner identity derived from the SID.
    pub owner: Owner,
    /// Size in bytes.
    pub size_bytes: u64,
    /// Last modification time.
    pub modified_at: DateTime<Utc>,
    /// Last access time.
    pub accessed_at: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Builds [`Metadata`] for a path.
#[derive(Debug)]
pub struct MetadataResolver {
    files: Box<dyn FileStatProvider>,
    security: Box<dyn SecurityResolver>,
}

impl MetadataResolver {
    /// Create a resolver from its capabilities.
    #[must_use]
    pub fn new(files: Box<dyn FileStatProvider>, security: Box<dyn SecurityResolver>) -> Self {
        Self { files, security }
    }

    /// Resolve metadata for `path`.
    ///
    /// The file is stat'ed before its owner is queried, so a missing file is
    /// reported as [`Error::FileNotFound`] without touching the security API.
    /// A SID that maps to no account yields [`Owner::Unresolved`] rather than
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if the file does not exist, or another
    /// error if its attributes or owner SID cannot be read.
    pub fn resolve(&self, path: &Path) -> Result<Metadata> {
        let stat = self.files.stat(path)?;
        let sid = self.security.owner_sid(path)?;

        let owner = match self.security.lookup_account(&sid) {
            Ok(Account { name, domain }) => Owner::Resolved { name, domain },
            Err(err) => {
                debug!(sid = %sid, error = %err, "Owner SID has no account");
                Owner::Unresolved {
                    raw_sid: sid.clone(),
                }
            }
        };
        trace!(path = %path.display(), owner = %owner, size = stat.size, "Resolved metadata");

        Ok(Metadata {
            path: path.to_path_buf(),
            sid,
            owner,
            size_bytes: stat.size,
            modified_at: stat.modified,
            accessed_at: stat.accessed,
            created_at: stat.created,
        })
    }
}
