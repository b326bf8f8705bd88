//! Batch command: every PDF in a source folder becomes one ledger row.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use shiwake_core::models::{OnDocumentError, ShiwakeConfig};
use shiwake_core::pipeline::{BatchReport, DefaultPipeline};

use super::config;
use super::models::default_model_dir;
use crate::output::LedgerWriter;
use crate::source::Source;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Local directory of PDFs (instead of a Drive folder)
    #[arg(short, long, conflicts_with = "folder_id")]
    dir: Option<PathBuf>,

    /// Drive folder id
    #[arg(long)]
    folder_id: Option<String>,

    /// Service-account credentials JSON
    #[arg(long)]
    credentials: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Emit an empty row for documents that cannot be processed
    #[arg(long)]
    empty_rows: bool,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

impl BatchArgs {
    fn apply(&self, config: &mut ShiwakeConfig) {
        if let Some(dir) = &self.dir {
            config.source.local_dir = Some(dir.clone());
        }
        if let Some(folder_id) = &self.folder_id {
            config.source.folder_id = Some(folder_id.clone());
            config.source.local_dir = None;
        }
        if let Some(credentials) = &self.credentials {
            config.source.credentials_path = credentials.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if self.empty_rows {
            config.output.on_document_error = OnDocumentError::EmptyRow;
        }
        if let Some(model_dir) = &self.model_dir {
            config.ocr.model_dir = Some(model_dir.clone());
        }
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = config::load(config_path)?;
    args.apply(&mut config);
    config.ocr.model_dir.get_or_insert_with(default_model_dir);

    let source = Source::from_config(&config).await?;
    let entries = source.list().await?;

    println!(
        "{} Found {} PDFs in {}",
        style("ℹ").blue(),
        entries.len(),
        source.describe()
    );

    // Fail on an unwritable output before any document is processed.
    let mut writer = LedgerWriter::create(&config.output.path)?;

    let pipeline = DefaultPipeline::from_config(&config);
    let mut batch = BatchReport::new(config.output.on_document_error);

    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("=>-"),
    );

    for entry in &entries {
        pb.set_message(entry.name());

        let result = match source.fetch(entry).await {
            Ok(fetched) => pipeline.process(&fetched.document),
            Err(e) => Err(e),
        };
        if let Err(e) = &result {
            warn!("Skipping {}: {}", e.document(), e);
        }
        batch.record(result);

        pb.inc(1);
    }

    pb.finish_and_clear();

    let rows = batch.rows();
    let written = writer.write_rows(&rows)?;
    writer.finish()?;

    info!("Wrote {} rows to {}", written, config.output.path.display());
    print_summary(&batch, written, &config, start);

    Ok(())
}

fn print_summary(batch: &BatchReport, written: usize, config: &ShiwakeConfig, start: Instant) {
    println!();
    println!("{}", style("Batch Processing Summary").bold());
    println!("  Documents:   {}", batch.len());
    println!("  Text layer:  {}", style(batch.text_layer_count()).green());
    println!("  OCR:         {}", style(batch.ocr_count()).cyan());
    println!("  Failed:      {}", style(batch.failed_count()).red());
    println!("  Time:        {:.2}s", start.elapsed().as_secs_f64());

    if batch.failed_count() > 0 {
        let action = match batch.policy() {
            OnDocumentError::Skip => "skipped",
            OnDocumentError::EmptyRow => "written as empty rows",
        };
        println!();
        println!("{} Failed documents ({}):", style("⚠").yellow(), action);
        for failure in batch.failures() {
            println!("  - {}", failure);
        }
    }

    println!();
    println!(
        "{} Wrote {} rows to {}",
        style("✓").green(),
        written,
        config.output.path.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: BatchArgs,
    }

    #[test]
    fn test_flags_override_config() {
        let wrapper = Wrapper::parse_from([
            "batch",
            "--folder-id",
            "folder-7",
            "-o",
            "ledger.csv",
            "--empty-rows",
        ]);

        let mut config = ShiwakeConfig::default();
        config.source.local_dir = Some(PathBuf::from("inbox"));
        wrapper.args.apply(&mut config);

        assert_eq!(config.source.folder_id.as_deref(), Some("folder-7"));
        assert_eq!(config.source.local_dir, None);
        assert_eq!(config.output.path, PathBuf::from("ledger.csv"));
        assert_eq!(config.output.on_document_error, OnDocumentError::EmptyRow);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let wrapper = Wrapper::parse_from(["batch"]);

        let mut config = ShiwakeConfig::default();
        wrapper.args.apply(&mut config);

        assert_eq!(config.output.path, PathBuf::from("output.csv"));
        assert_eq!(config.output.on_document_error, OnDocumentError::Skip);
    }
}
