//! Process command - extract the milestone table from a single invoice PDF.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use hashbon_core::export::{build_sheet, save_csv, tracking_file_name};
use hashbon_core::models::config::HashbonConfig;
use hashbon_core::{process_pdf, ExtractionResult};

use super::{format_amount, format_text, load_config, render_tables, LayoutArg, OutputFormat};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: <name>_tracking.csv for CSV, stdout otherwise)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Tracking sheet layout (default from configuration)
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Loading PDF...");
    pb.set_position(10);
    let data = fs::read(&args.input)?;

    pb.set_message("Extracting tables...");
    pb.set_position(40);
    let (content, result) = process_pdf(&data, &config)?;

    pb.set_position(100);
    pb.finish_and_clear();

    if result.is_empty() {
        warn!("No milestone table in {}", args.input.display());
        eprintln!(
            "{} No phases found in {}",
            style("⚠").yellow(),
            args.input.display()
        );
        println!("{}", style("Raw tables:").dim());
        print!("{}", render_tables(&content));
        return Ok(());
    }

    match args.format {
        OutputFormat::Csv => {
            let output_path = args.output.clone().unwrap_or_else(|| {
                PathBuf::from(tracking_file_name(&args.input, &config.export.file_suffix))
            });
            write_tracking_csv(&result, &config, args.layout, &output_path)?;
            print_summary(&result);
            println!(
                "{} Output written to {}",
                style("✓").green(),
                output_path.display()
            );
        }
        OutputFormat::Json | OutputFormat::Text => {
            let output = format_result(&result, args.format)?;
            if let Some(output_path) = &args.output {
                fs::write(output_path, &output)?;
                println!(
                    "{} Output written to {}",
                    style("✓").green(),
                    output_path.display()
                );
            } else {
                println!("{}", output);
            }
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Write the tracking sheet for one result.
pub fn write_tracking_csv(
    result: &ExtractionResult,
    config: &HashbonConfig,
    layout: Option<LayoutArg>,
    path: &std::path::Path,
) -> anyhow::Result<()> {
    let layout = layout.map(Into::into).unwrap_or(config.export.layout);
    let sheet = build_sheet(result, &config.vocabulary, layout);
    save_csv(&sheet, path, &config.export)?;
    Ok(())
}

/// JSON or text rendering of a result.
pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Text => Ok(format_text(result)),
        OutputFormat::Csv => anyhow::bail!("CSV output is written as a tracking sheet"),
    }
}

fn print_summary(result: &ExtractionResult) {
    println!(
        "{} {} - {} phases",
        style("✓").green(),
        result.company,
        result.phases.len()
    );
    println!(
        "   Contract {}  Billed {}  Incl. VAT {}",
        format_amount(result.contract_total),
        format_amount(result.billed_total),
        format_amount(result.vat_total)
    );
}
