//! Batch processing command for multiple invoice files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use hashbon_core::export::{tracking_file_name, UTF8_BOM};
use hashbon_core::models::config::HashbonConfig;
use hashbon_core::models::record::format_number;
use hashbon_core::{process_pdf, ExtractionResult};

use super::process::{format_result, write_tracking_csv};
use super::{load_config, output_path, LayoutArg, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input PDFs
    #[arg(required = true)]
    input: String,

    /// Output directory (default: current directory)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "csv")]
    format: OutputFormat,

    /// Tracking sheet layout (default from configuration)
    #[arg(long, value_enum)]
    layout: Option<LayoutArg>,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Outcome of a single file.
enum Outcome {
    Extracted(ExtractionResult),
    NoPhases,
    Failed(String),
}

struct ProcessResult {
    path: PathBuf,
    outcome: Outcome,
    processing_time_ms: u64,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(files.len());

    for path in files {
        let file_start = Instant::now();
        let outcome = match process_single_file(&path, &config, &args) {
            Ok(Some(result)) => Outcome::Extracted(result),
            Ok(None) => {
                warn!("No phases found in {}", path.display());
                Outcome::NoPhases
            }
            Err(e) => {
                let error_msg = e.to_string();
                if !args.continue_on_error {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    pb.abandon();
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
                warn!("Failed to process {}: {}", path.display(), error_msg);
                Outcome::Failed(error_msg)
            }
        };

        results.push(ProcessResult {
            path,
            outcome,
            processing_time_ms: file_start.elapsed().as_millis() as u64,
        });
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    if args.summary {
        let summary_path = output_path(args.output_dir.as_deref(), "summary.csv".to_string());
        write_summary(&summary_path, &results, config.export.write_bom)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let extracted = results
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Extracted(_)))
        .count();
    let empty = results
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::NoPhases))
        .count();
    let failed: Vec<_> = results
        .iter()
        .filter_map(|r| match &r.outcome {
            Outcome::Failed(e) => Some((&r.path, e)),
            _ => None,
        })
        .collect();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} extracted, {} without phases, {} failed",
        style(extracted).green(),
        style(empty).yellow(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for (path, error) in &failed {
            println!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}

/// Extract one file and write its output; `None` when no phases were found.
fn process_single_file(
    path: &Path,
    config: &HashbonConfig,
    args: &BatchArgs,
) -> anyhow::Result<Option<ExtractionResult>> {
    let data = fs::read(path)?;
    let (_, result) = process_pdf(&data, config)?;

    if result.is_empty() {
        return Ok(None);
    }

    let dir = args.output_dir.as_deref();
    match args.format {
        OutputFormat::Csv => {
            let target = output_path(dir, tracking_file_name(path, &config.export.file_suffix));
            write_tracking_csv(&result, config, args.layout, &target)?;
            debug!("Wrote output to {}", target.display());
        }
        format => {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("invoice");
            let target = output_path(dir, format!("{}.{}", stem, format.extension()));
            fs::write(&target, format_result(&result, format)?)?;
            debug!("Wrote output to {}", target.display());
        }
    }

    Ok(Some(result))
}

fn write_summary(path: &Path, results: &[ProcessResult], write_bom: bool) -> anyhow::Result<()> {
    let mut file = fs::File::create(path)?;
    if write_bom {
        file.write_all(UTF8_BOM)?;
    }
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "filename",
        "status",
        "company",
        "phases",
        "contract_total",
        "billed_total",
        "vat_total",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let time_ms = result.processing_time_ms.to_string();

        match &result.outcome {
            Outcome::Extracted(extraction) => {
                let phases = extraction.phases.len().to_string();
                let contract = format_number(extraction.contract_total);
                let billed = format_number(extraction.billed_total);
                let vat = format_number(extraction.vat_total);
                wtr.write_record([
                    filename,
                    "success",
                    extraction.company.as_str(),
                    phases.as_str(),
                    contract.as_str(),
                    billed.as_str(),
                    vat.as_str(),
                    time_ms.as_str(),
                    "",
                ])?;
            }
            Outcome::NoPhases => {
                wtr.write_record([filename, "no_phases", "", "0", "", "", "", time_ms.as_str(), ""])?;
            }
            Outcome::Failed(error) => {
                wtr.write_record([filename, "error", "", "", "", "", "", time_ms.as_str(), error.as_str()])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}
