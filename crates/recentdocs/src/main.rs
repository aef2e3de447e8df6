//! `recentdocs` - CLI for the recent-documents decoder
//!
//! This binary reads the recent-documents registry key, decodes every entry
//! and prints a report on stdout. Logs go to stderr.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufWriter};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use recentdocs::cli::{Cli, Command, ConfigCommand, PidlCommand, ScanCommand};
use recentdocs::{
    init_logging, pidl, platform, scan, Config, MetadataResolver, RecentEntryDecoder,
    ReportOptions, Reporter, StdFileStat,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command {
        Command::Scan(scan_cmd) => handle_scan(cli.config, &scan_cmd),
        Command::Pidl(pidl_cmd) => handle_pidl(&pidl_cmd),
        Command::Config(config_cmd) => handle_config(cli.config, config_cmd),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    Config::load_from(path).context("failed to load configuration")
}

fn handle_scan(config_path: Option<PathBuf>, cmd: &ScanCommand) -> Result<()> {
    let mut config = load_config(config_path)?;
    cmd.apply_to(&mut config);
    config.validate()?;

    info!(
        platform = platform::platform_name(),
        key = %config.key_display(),
        backend = ?config.decode.backend,
        "Starting scan"
    );

    let reader = platform::registry_reader(&config.registry)?;
    let decoder = RecentEntryDecoder::new(
        platform::pidl_resolver(config.decode.backend)?,
        MetadataResolver::new(Box::new(StdFileStat), platform::security_resolver()?),
    );

    let stdout = io::stdout().lock();
    let mut reporter = Reporter::new(BufWriter::new(stdout), ReportOptions::from(&config.report));
    let summary = scan::run(reader.as_ref(), &decoder, &mut reporter)
        .with_context(|| format!("scan of {} failed", config.key_display()))?;
    if config.report.summary {
        reporter.write_summary(&summary)?;
    }
    reporter.into_inner()?;
    Ok(())
}

fn handle_pidl(cmd: &PidlCommand) -> Result<()> {
    let data = pidl::parse_hex(&cmd.hex).context("could not read the id list")?;

    let stdout = io::stdout().lock();
    let mut reporter = Reporter::new(BufWriter::new(stdout), ReportOptions::default());
    reporter.write_inspection(&data)?;
    reporter.into_inner()?;
    Ok(())
}

fn handle_config(config_path: Option<PathBuf>, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let config = load_config(config_path)?;
            println!("Current Configuration");
            println!("=====================");
            println!();
            println!("[Registry]");
            println!("  Hive:          {}", config.registry.hive);
            println!("  Key path:      {}", config.registry.key_path);
            println!("  Recursive:     {}", config.registry.recursive);
            println!();
            println!("[Decode]");
            println!("  Backend:       {:?}", config.decode.backend);
            println!();
            println!("[Report]");
            println!("  Show invalid:  {}", config.report.show_invalid);
            println!("  Time format:   {}", config.report.time_format);
            println!("  Summary:       {}", config.report.summary);
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
