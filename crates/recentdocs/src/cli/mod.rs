//! Command-line interface for recentdocs.
//!
//! This module provides the CLI structure for the `recentdocs` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{BackendArg, ConfigCommand, HiveArg, PidlCommand, ScanCommand};

/// recentdocs - List recently opened documents from the registry
///
/// Decodes the shell item id lists Windows stores for recently opened and
/// saved files, and reports each file's path, owner, size and timestamps.
#[derive(Debug, Parser)]
#[command(name = "recentdocs")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode and report every recent entry under the configured key
    Scan(ScanCommand),

    /// Inspect a single shell item id list given as hex
    Pidl(PidlCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn cli(verbose: u8, quiet: bool) -> Cli {
        Cli {
            config: None,
            verbose,
            quiet,
            command: Command::Config(ConfigCommand::Path),
        }
    }

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "recentdocs");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(cli(0, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(3, true).verbosity(), Verbosity::Quiet);
        assert_eq!(cli(0, false).verbosity(), Verbosity::Normal);
        assert_eq!(cli(1, false).verbosity(), Verbosity::Verbose);
        assert_eq!(cli(2, false).verbosity(), Verbosity::Trace);
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from(["recentdocs", "scan"]).unwrap();
        let Command::Scan(scan) = cli.command else {
            panic!("expected scan");
        };
        assert!(scan.hive.is_none());
        assert!(scan.key.is_none());
        assert!(!scan.no_recurse);
        assert!(scan.backend.is_none());
    }

    #[test]
    fn test_parse_scan_overrides() {
        let cli = Cli::try_parse_from([
            "recentdocs",
            "scan",
            "--hive",
            "users",
            "--key",
            r"Case\Software",
            "--no-recurse",
            "--backend",
            "builtin",
        ])
        .unwrap();
        let Command::Scan(scan) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(scan.hive, Some(HiveArg::Users));
        assert_eq!(scan.key.as_deref(), Some(r"Case\Software"));
        assert!(scan.no_recurse);
        assert_eq!(scan.backend, Some(BackendArg::Builtin));
    }

    #[test]
    fn test_parse_pidl() {
        let cli = Cli::try_parse_from(["recentdocs", "pidl", "14001f50"]).unwrap();
        let Command::Pidl(pidl) = cli.command else {
            panic!("expected pidl");
        };
        assert_eq!(pidl.hex, "14001f50");
    }

    #[test]
    fn test_parse_pidl_requires_hex() {
        assert!(Cli::try_parse_from(["recentdocs", "pidl"]).is_err());
    }

    #[test]
    fn test_parse_config_validate() {
        let cli =
            Cli::try_parse_from(["recentdocs", "config", "validate", "--file", "x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_parse_with_config() {
        let cli = Cli::try_parse_from(["recentdocs", "-c", "/custom/config.toml", "scan"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_global_flags_after_command() {
        let cli = Cli::try_parse_from(["recentdocs", "scan", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["recentdocs", "config", "show", "-q"]).unwrap();
        assert!(cli.quiet);
    }

    #[test]
    fn test_parse_unknown_hive() {
        assert!(Cli::try_parse_from(["recentdocs", "scan", "--hive", "classes_root"]).is_err());
    }
}
