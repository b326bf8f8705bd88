//! Process command - run the pipeline on a single PDF or image.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use console::style;
use tracing::info;

use shiwake_core::models::Document;
use shiwake_core::pipeline::{DefaultPipeline, DocumentReport};

use super::config;
use super::models::default_model_dir;
use crate::output::to_csv_string;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON report
    Json,
    /// Ledger CSV (header and one row)
    Csv,
    /// Plain text summary
    Text,
}

enum InputKind {
    Pdf,
    Image,
}

fn input_kind(path: &Path) -> anyhow::Result<InputKind> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "pdf" => Ok(InputKind::Pdf),
        "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => Ok(InputKind::Image),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = config::load(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = Some(model_dir.clone());
    }
    config.ocr.model_dir.get_or_insert_with(default_model_dir);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());
    let pipeline = DefaultPipeline::from_config(&config);

    let report = match input_kind(&args.input)? {
        InputKind::Pdf => {
            let document = Document::from_path(&args.input)?;
            pipeline.process(&document)?
        }
        InputKind::Image => {
            let image = image::open(&args.input)?;
            let name = args.input.display().to_string();
            pipeline.process_images(&name, &[image])?
        }
    };

    let output = format_report(&report, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn format_report(report: &DocumentReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(report)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Csv => to_csv_string([&report.row]),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn format_text(report: &DocumentReport) -> String {
    let mut output = String::new();
    let missing = "-";

    output.push_str(&format!("Document: {}\n", report.name));
    output.push_str(&format!("Extracted via: {}\n", report.path));
    output.push('\n');

    output.push_str("Fields:\n");
    output.push_str(&format!(
        "  Date:         {}\n",
        report.fields.date.as_deref().unwrap_or(missing)
    ));
    output.push_str(&format!(
        "  Amount:       {}\n",
        report.fields.amount.as_deref().unwrap_or(missing)
    ));
    output.push_str(&format!(
        "  Counterparty: {}\n",
        report.fields.counterparty.as_deref().unwrap_or(missing)
    ));
    output.push('\n');

    output.push_str("Ledger row:\n");
    let mut any = false;
    for (column, value) in report.row.filled() {
        output.push_str(&format!("  [{:>2}] {}: {}\n", column.index(), column, value));
        any = true;
    }
    if !any {
        output.push_str("  (all cells empty)\n");
    }

    output.push_str(&format!("\nProcessing time: {}ms\n", report.processing_time_ms));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use shiwake_core::invoice::ParsedFields;
    use shiwake_core::ledger::RowBuilder;
    use shiwake_core::models::ExtractedText;
    use shiwake_core::pipeline::ExtractionPath;

    fn report() -> DocumentReport {
        let fields = ParsedFields {
            date: Some("2024-03-15".to_string()),
            amount: Some("12345".to_string()),
            counterparty: None,
        };
        DocumentReport {
            id: "a.pdf".to_string(),
            name: "a.pdf".to_string(),
            path: ExtractionPath::Ocr { pages: 2 },
            text: ExtractedText::new("2024-03-15 12,345\n"),
            row: RowBuilder::new().build(&fields),
            fields,
            processing_time_ms: 12,
        }
    }

    #[test]
    fn test_format_text() {
        let text = format_text(&report());
        assert!(text.contains("Extracted via: OCR (2 pages)"));
        assert!(text.contains("Counterparty: -"));
        assert!(text.contains("[ 0] 月日: 2024/03/15"));
        assert!(text.contains("[15] 借方取引金額: 12345"));
    }

    #[test]
    fn test_format_json() {
        let json = format_report(&report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["path"]["kind"], "ocr");
        assert_eq!(value["path"]["pages"], 2);
        assert_eq!(value["fields"]["amount"], "12345");
        assert_eq!(value["row"][0], "2024/03/15");
    }

    #[test]
    fn test_unsupported_input() {
        assert!(input_kind(Path::new("invoice.docx")).is_err());
        assert!(matches!(input_kind(Path::new("scan.PNG")), Ok(InputKind::Image)));
    }
}
