//! `recentdocs` - Decode the recent-documents history Windows keeps in the registry
//!
//! This library turns the shell item id lists stored under the Open/Save
//! dialog history key into file paths, and enriches each path with its
//! owner, size and timestamps.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod decoder;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod pidl;
pub mod platform;
pub mod registry;
pub mod report;
pub mod scan;

pub use config::Config;
pub use decoder::{DecodedRecent, RecentEntryDecoder, Resolution, FILE_DELETED, INVALID_FORMAT};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use metadata::{
    Account, FileStat, FileStatProvider, Metadata, MetadataResolver, Owner, SecurityResolver, Sid,
    StdFileStat,
};
pub use pidl::{BuiltinPidlResolver, PidlPathResolver};
pub use registry::{RecentEntry, RegistryReader};
pub use report::{ReportOptions, Reporter};
pub use scan::ScanSummary;
