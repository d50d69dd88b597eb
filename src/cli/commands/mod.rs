//! Command implementations for the intake CLI
//!
//! Each command is implemented in its own module; `shared` holds logging,
//! configuration loading and progress reporting used by all of them.

pub mod catalog;
pub mod shared;
pub mod submit;
pub mod validate;

pub use shared::IntakeStats;

use crate::Result;
use crate::cli::args::{Args, Commands};

/// Dispatch to the subcommand handler
///
/// Callers must supply a subcommand; `main` shows help when there is none.
pub async fn run(args: Args) -> Result<IntakeStats> {
    match args.command {
        Some(Commands::Catalog(catalog_args)) => catalog::run_catalog(catalog_args).await,
        Some(Commands::Validate(validate_args)) => validate::run_validate(validate_args).await,
        Some(Commands::Submit(submit_args)) => submit::run_submit(submit_args).await,
        None => Ok(IntakeStats::default()),
    }
}
