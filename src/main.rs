use clap::Parser;
use exo_intake::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let shutdown_signal = async {
            if tokio::signal::ctrl_c().await.is_err() {
                // no signal handler; run to completion
                std::future::pending::<()>().await;
            }
        };

        // dropping the command future drops its session, which cancels
        // every pending validation and transfer task
        tokio::select! {
            result = commands::run(args) => result.map(Some),
            _ = shutdown_signal => {
                eprintln!("\nReceived CTRL+C, discarding admitted files...");
                Ok(None)
            }
        }
    });

    match result {
        Ok(Some(_stats)) => process::exit(0),
        Ok(None) => process::exit(130),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("exo-intake - Exoplanet Dataset Intake");
    println!("=====================================");
    println!();
    println!("Validate CSV files of exoplanet transit observations against the");
    println!("required field catalog and submit their rows to the planet store.");
    println!();
    println!("USAGE:");
    println!("    exo-intake <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    catalog     List the fields every dataset must contain");
    println!("    validate    Check files against the field catalog without submitting");
    println!("    submit      Validate files and submit their rows");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("EXAMPLES:");
    println!("    exo-intake validate data/kepler.csv data/tess/");
    println!("    exo-intake submit data/ --category research --preview");
    println!("    exo-intake submit data/kepler.csv --endpoint http://localhost:3000/api/planetas/agregarPlanetas");
    println!();
    println!("For detailed help on any command, use:");
    println!("    exo-intake <COMMAND> --help");
}
