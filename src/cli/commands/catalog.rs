//! Catalog command: list the fields every dataset must contain

use super::shared::{IntakeStats, setup_logging};
use crate::catalog::FIELD_CATALOG;
use crate::cli::args::{CatalogArgs, OutputFormat};
use crate::constants::CATEGORIES;
use crate::error::Result;
use colored::*;
use serde_json::json;

pub async fn run_catalog(args: CatalogArgs) -> Result<IntakeStats> {
    setup_logging(&args.common)?;

    match args.output_format {
        OutputFormat::Human => {
            println!("{}", "Required fields".bright_green().bold());
            for (index, field) in FIELD_CATALOG.iter().enumerate() {
                println!(
                    "  {}. {} {}",
                    (index + 1).to_string().bright_yellow(),
                    field.key.bright_cyan(),
                    format!("- {}", field.description).bright_black()
                );
            }
            println!();
            println!("{}", "Categories".bright_green().bold());
            for (value, label) in CATEGORIES {
                println!("  {} {}", value.bright_cyan(), format!("({})", label).bright_black());
            }
        }
        OutputFormat::Json => {
            let fields: Vec<_> = FIELD_CATALOG
                .iter()
                .map(|field| json!({ "key": field.key, "description": field.description }))
                .collect();
            let categories: Vec<_> = CATEGORIES
                .iter()
                .map(|(value, label)| json!({ "value": value, "label": label }))
                .collect();
            let document = json!({ "fields": fields, "categories": categories });
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
    }

    Ok(IntakeStats::default())
}
