//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod process;
pub mod tables;

use std::path::{Path, PathBuf};

use hashbon_core::models::config::HashbonConfig;
use hashbon_core::models::SheetLayout;
use hashbon_core::{ExtractionResult, PdfContent};
use tracing::debug;

/// Output format of extraction results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tracking sheet CSV (UTF-8 with BOM)
    Csv,
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

/// Column layout of the tracking sheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LayoutArg {
    /// Source table headers plus the company column
    Source,
    /// Fixed 13-column tracking header
    Canonical,
}

impl From<LayoutArg> for SheetLayout {
    fn from(layout: LayoutArg) -> Self {
        match layout {
            LayoutArg::Source => SheetLayout::Source,
            LayoutArg::Canonical => SheetLayout::Canonical,
        }
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hashbon")
        .join("config.json")
}

/// Configuration file in effect: `--config` if given, else the default path.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration, falling back to defaults when no file exists.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<HashbonConfig> {
    let path = config_path(explicit);

    if explicit.is_some() || path.exists() {
        debug!("Loading configuration from {}", path.display());
        return HashbonConfig::from_file(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e));
    }

    Ok(HashbonConfig::default())
}

/// Shekel amount rounded to whole units with thousands separators.
pub fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0 { "-" } else { "" };
    format!("₪{}{}", sign, grouped)
}

/// Human-readable report: totals, detected columns, then every phase.
pub fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Company: {}\n", result.company));
    output.push_str(&format!("Phases: {}\n", result.phases.len()));
    output.push('\n');

    output.push_str("Totals:\n");
    output.push_str(&format!("  Contract:    {}\n", format_amount(result.contract_total)));
    output.push_str(&format!("  Billed:      {}\n", format_amount(result.billed_total)));
    output.push_str(&format!("  Incl. VAT:   {}\n", format_amount(result.vat_total)));
    output.push('\n');

    output.push_str(&format!(
        "Columns ({}): {}\n",
        result.headers.len(),
        result.headers.join(", ")
    ));

    for (i, phase) in result.phases.iter().enumerate() {
        output.push('\n');
        output.push_str(&format!("Phase {}: {}\n", i + 1, phase.stage_text()));
        for header in &result.headers {
            let value = phase.get(header).map(|v| v.display()).unwrap_or_default();
            output.push_str(&format!("  - {}: {}\n", header, value));
        }
    }

    output
}

/// Every extracted table, page by page, for diagnostics.
pub fn render_tables(content: &PdfContent) -> String {
    let mut output = String::new();

    for page in &content.pages {
        if page.tables.is_empty() {
            output.push_str(&format!("Page {}: no tables\n", page.number));
            continue;
        }

        output.push_str(&format!("Page {}\n", page.number));
        for (i, table) in page.tables.iter().enumerate() {
            output.push_str(&format!(
                "  Table {} ({} rows x {} cols)\n",
                i + 1,
                table.num_rows(),
                table.num_cols()
            ));
            for row in &table.rows {
                let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
                output.push_str(&format!("    {}\n", cells.join(" | ")));
            }
        }
    }

    output
}

/// Output path for an input file inside an optional directory.
pub fn output_path(dir: Option<&Path>, file_name: String) -> PathBuf {
    match dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbon_core::pdf::{PdfPage, Table};

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "₪0");
        assert_eq!(format_amount(999.4), "₪999");
        assert_eq!(format_amount(1234567.0), "₪1,234,567");
        assert_eq!(format_amount(-2500.0), "₪-2,500");
    }

    #[test]
    fn test_render_tables() {
        let content = PdfContent::from_pages(vec![
            PdfPage {
                number: 1,
                text: String::new(),
                tables: vec![Table::new(
                    1,
                    vec![
                        vec![Some("a".into()), Some("b".into())],
                        vec![None, Some("2".into())],
                    ],
                )],
            },
            PdfPage {
                number: 2,
                text: String::new(),
                tables: vec![],
            },
        ]);

        let rendered = render_tables(&content);
        assert!(rendered.contains("Table 1 (2 rows x 2 cols)"));
        assert!(rendered.contains("    a | b\n"));
        assert!(rendered.contains("     | 2\n"));
        assert!(rendered.contains("Page 2: no tables"));
    }

    #[test]
    fn test_load_config_missing_explicit_file_fails() {
        assert!(load_config(Some("/nonexistent/hashbon.json")).is_err());
    }
}
