//! Tables command - print every table found in a PDF.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use hashbon_core::invoice::TableClassifier;
use hashbon_core::pdf::{PdfExtractor, PdfProcessor};

use super::{load_config, render_tables};

/// Arguments for the tables command.
#[derive(Args)]
pub struct TablesArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Print tables as JSON
    #[arg(long)]
    json: bool,
}

pub fn run(args: TablesArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let data = fs::read(&args.input)?;
    let mut extractor = PdfExtractor::new().with_table_config(config.tables.clone());
    extractor.load(&data)?;
    let content = extractor.extract_all()?;

    info!(
        "{} tables on {} pages",
        content.tables().count(),
        extractor.page_count()
    );

    if args.json {
        let pages: Vec<_> = content
            .pages
            .iter()
            .map(|page| serde_json::json!({ "page": page.number, "tables": page.tables }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    print!("{}", render_tables(&content));

    let classifier = TableClassifier::new(std::sync::Arc::new(config.vocabulary));
    match classifier.find_milestone_table(content.tables()) {
        Some(table) => println!("Milestone table: page {}", table.page),
        None => println!("Milestone table: none"),
    }

    Ok(())
}
