//! Command-line argument definitions for the intake tool
//!
//! This module defines the CLI interface using the clap derive API.

use crate::config::IntakeConfig;
use crate::constants::CATEGORY_VALUES;
use crate::error::{IntakeError, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// CLI arguments for the exoplanet dataset intake tool
///
/// Checks CSV files of transit observations against the required field
/// catalog and submits their rows to the planet storage backend.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "exo-intake",
    version,
    about = "Validate exoplanet CSV datasets and submit them to the planet store",
    long_about = "Admits CSV files of exoplanet transit observations, checks every header \
                  against the catalog of required fields, parses accepted files into row \
                  records and submits all rows in one batch under a chosen category."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// List the fields every dataset must contain
    Catalog(CatalogArgs),
    /// Check files against the field catalog without submitting
    Validate(ValidateArgs),
    /// Validate files and submit their rows to the storage backend
    Submit(SubmitArgs),
}

/// Options shared by every subcommand
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CommonArgs {
    /// Path to configuration file
    ///
    /// Defaults to the platform config directory, e.g.
    /// ~/.config/exo-intake/config.toml, when that file exists.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Path to configuration file"
    )]
    pub config_file: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        help = "Enable verbose logging (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress progress bars and informational output
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Only show errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl CommonArgs {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Arguments for the catalog command
#[derive(Debug, Clone, Parser)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Output format for the field list
    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Arguments for the validate command
#[derive(Debug, Clone, Parser)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// CSV files or directories to check
    ///
    /// Directories are searched recursively for files ending in `.csv`.
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format for the per-file report
    #[arg(long = "format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Arguments for the submit command
#[derive(Debug, Clone, Parser)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// CSV files or directories to submit
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Category the rows are filed under
    ///
    /// Defaults to the configured category (exoplanet).
    #[arg(
        long = "category",
        value_name = "CATEGORY",
        value_parser = clap::builder::PossibleValuesParser::new(CATEGORY_VALUES.iter().copied())
    )]
    pub category: Option<String>,

    /// Storage backend URL, overriding the configured endpoint
    #[arg(long = "endpoint", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Print the JSON payload before submitting
    #[arg(long = "preview")]
    pub preview: bool,

    /// Validate and build the payload without sending it
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl SubmitArgs {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_overrides(&self, mut config: IntakeConfig) -> Result<IntakeConfig> {
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        config.validate()?;
        Ok(config)
    }

    pub fn get_category(&self, config: &IntakeConfig) -> Result<String> {
        let category = self
            .category
            .clone()
            .unwrap_or_else(|| config.default_category.clone());
        if !CATEGORY_VALUES.contains(&category.as_str()) {
            return Err(IntakeError::configuration(format!(
                "Unknown category '{}'. Valid categories: {}",
                category,
                CATEGORY_VALUES.join(", ")
            )));
        }
        Ok(category)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_args_parse() {
        let args = Args::parse_from([
            "exo-intake",
            "submit",
            "data/kepler.csv",
            "data/tess",
            "--category",
            "research",
            "--dry-run",
            "-vv",
        ]);

        match args.command {
            Some(Commands::Submit(submit)) => {
                assert_eq!(submit.paths.len(), 2);
                assert_eq!(submit.category.as_deref(), Some("research"));
                assert!(submit.dry_run);
                assert!(!submit.preview);
                assert_eq!(submit.common.get_log_level(), "debug");
            }
            other => panic!("Expected submit command, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_is_rejected_by_parser() {
        let result = Args::try_parse_from([
            "exo-intake",
            "submit",
            "a.csv",
            "--category",
            "asteroid",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_requires_paths() {
        assert!(Args::try_parse_from(["exo-intake", "validate"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["exo-intake", "catalog", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_category_falls_back_to_config() {
        let args = Args::parse_from(["exo-intake", "submit", "a.csv"]);
        let Some(Commands::Submit(submit)) = args.command else {
            panic!("Expected submit command");
        };

        let config = IntakeConfig::default().with_default_category("analysis");
        assert_eq!(submit.get_category(&config).unwrap(), "analysis");

        let bad = IntakeConfig::default().with_default_category("comet");
        assert!(submit.get_category(&bad).is_err());
    }

    #[test]
    fn test_endpoint_override() {
        let args = Args::parse_from([
            "exo-intake",
            "submit",
            "a.csv",
            "--endpoint",
            "http://127.0.0.1:9000/store",
        ]);
        let Some(Commands::Submit(submit)) = args.command else {
            panic!("Expected submit command");
        };

        let config = submit.apply_overrides(IntakeConfig::default()).unwrap();
        assert_eq!(config.endpoint, "http://127.0.0.1:9000/store");
        assert_eq!(submit.common.get_log_level(), "warn");
    }
}
