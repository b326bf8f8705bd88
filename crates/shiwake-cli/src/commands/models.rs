//! Models command - download and manage the PaddleOCR model files.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use futures_util::StreamExt;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

use shiwake_core::ocr::{Language, LanguageProfile, DETECTION_MODEL};

use super::config;

/// Arguments for the models command.
#[derive(Args)]
pub struct ModelsArgs {
    /// Model directory (defaults to `ocr.model_dir`, then the user data dir)
    #[arg(short, long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: ModelsCommand,
}

#[derive(Subcommand)]
enum ModelsCommand {
    /// List the model files the language profile needs
    List,

    /// Download models
    Download(DownloadArgs),

    /// Check model status
    Status,

    /// Remove downloaded models
    Clean,
}

#[derive(Args)]
struct DownloadArgs {
    /// Base URL the model files are fetched from (`<base>/<file>`)
    #[arg(long, env = "SHIWAKE_MODEL_URL")]
    base_url: String,

    /// Force re-download even if files exist
    #[arg(long)]
    force: bool,
}

/// A file the OCR engine loads.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ModelFile {
    filename: &'static str,
    description: String,
}

/// Files needed for `profile`: the shared detector, then a recognizer and
/// dictionary per language.
fn required_files(profile: LanguageProfile) -> Vec<ModelFile> {
    let mut files = vec![ModelFile {
        filename: DETECTION_MODEL,
        description: "text detection (all languages)".to_string(),
    }];

    for language in profile.languages() {
        files.push(ModelFile {
            filename: language.recognition_model(),
            description: format!("{} recognition", language_name(language)),
        });
        files.push(ModelFile {
            filename: language.dictionary(),
            description: format!("{} character dictionary", language_name(language)),
        });
    }

    files
}

fn language_name(language: Language) -> &'static str {
    match language {
        Language::Japanese => "Japanese",
        Language::English => "Latin",
    }
}

/// Default model directory under the user data dir.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("shiwake")
        .join("models")
}

pub async fn run(args: ModelsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = config::load(config_path)?;
    let model_dir = args
        .dir
        .or(config.ocr.model_dir.clone())
        .unwrap_or_else(default_model_dir);
    let files = required_files(config.ocr.profile());

    match args.command {
        ModelsCommand::List => list_models(&files),
        ModelsCommand::Download(download_args) => download_models(download_args, &model_dir, &files).await,
        ModelsCommand::Status => check_status(&model_dir, &files).map(|_| ()),
        ModelsCommand::Clean => clean_models(&model_dir, &files),
    }
}

fn list_models(files: &[ModelFile]) -> anyhow::Result<()> {
    println!("{}", style("Required Model Files").bold());
    println!();

    for model in files {
        println!("    {:<20} {}", model.filename, model.description);
    }

    println!();
    println!("Commands:");
    println!("  shiwake models download --base-url <URL>   Download missing files");
    println!("  shiwake models status                      Check what is installed");

    Ok(())
}

async fn download_models(args: DownloadArgs, model_dir: &Path, files: &[ModelFile]) -> anyhow::Result<()> {
    fs::create_dir_all(model_dir)?;

    println!(
        "{} Downloading OCR models to {}",
        style("ℹ").blue(),
        model_dir.display()
    );
    println!();

    let client = reqwest::Client::builder()
        .user_agent(concat!("shiwake-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(300))
        .build()?;

    let multi_progress = MultiProgress::new();
    let mut success_count = 0;
    let mut skip_count = 0;
    let mut error_count = 0;

    let base_url = args.base_url.trim_end_matches('/');

    for model in files {
        let path = model_dir.join(model.filename);

        if !args.force && is_present(&path) {
            println!(
                "  {} {} (already exists, {})",
                style("✓").green(),
                model.filename,
                format_size(fs::metadata(&path)?.len())
            );
            skip_count += 1;
            continue;
        }

        let pb = multi_progress.add(ProgressBar::new(0));
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  {spinner:.green} {msg:<30} [{bar:25.cyan/blue}] {bytes}/{total_bytes}")?
                .progress_chars("=>-"),
        );
        pb.set_message(model.filename.to_string());

        let url = format!("{}/{}", base_url, model.filename);
        match download_file(&client, &url, &path, &pb).await {
            Ok(()) => {
                pb.finish_with_message(format!("{} {}", style("✓").green(), model.filename));
                success_count += 1;
            }
            Err(e) => {
                pb.finish_with_message(format!("{} {} - {}", style("✗").red(), model.filename, e));
                error_count += 1;
            }
        }
    }

    println!();

    if error_count == 0 {
        println!("{} Models downloaded successfully!", style("✓").green().bold());
        if skip_count > 0 {
            println!(
                "   {} downloaded, {} already present",
                success_count, skip_count
            );
        }
    } else {
        println!(
            "{} Download completed with errors",
            style("⚠").yellow().bold()
        );
        println!(
            "   {} downloaded, {} skipped, {} failed",
            success_count, skip_count, error_count
        );
        println!();
        println!("Retry with: shiwake models download --base-url <URL> --force");
    }

    println!();
    check_status(model_dir, files)?;

    if error_count > 0 {
        anyhow::bail!("{} model files failed to download", error_count);
    }
    Ok(())
}

async fn download_file(
    client: &reqwest::Client,
    url: &str,
    path: &Path,
    pb: &ProgressBar,
) -> anyhow::Result<()> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        anyhow::bail!("HTTP {}", response.status());
    }

    if let Some(content_length) = response.content_length() {
        pb.set_length(content_length);
    }

    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path)?;

    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    file.flush()?;
    drop(file);

    fs::rename(&temp_path, path)?;

    Ok(())
}

fn is_present(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_file() && m.len() > 0).unwrap_or(false)
}

/// Print the state of every file; true when all are present.
fn check_status(model_dir: &Path, files: &[ModelFile]) -> anyhow::Result<bool> {
    println!("{}", style("Model Status").bold());
    println!("Directory: {}", model_dir.display());
    println!();

    let mut all_present = true;
    let mut total_size: u64 = 0;

    for model in files {
        let path = model_dir.join(model.filename);
        let (status, size_str) = if is_present(&path) {
            let size = fs::metadata(&path)?.len();
            total_size += size;
            (style("✓").green(), format_size(size))
        } else {
            all_present = false;
            (style("✗").red(), "missing".to_string())
        };

        println!("    {} {:<25} {:>10}", status, model.filename, size_str);
    }

    if all_present {
        println!(
            "    {} Ready ({} total)",
            style("✓").green(),
            format_size(total_size)
        );
    } else {
        println!(
            "    {} Run 'shiwake models download --base-url <URL>' to download",
            style("⚠").yellow()
        );
    }

    Ok(all_present)
}

fn clean_models(model_dir: &Path, files: &[ModelFile]) -> anyhow::Result<()> {
    let mut total_removed = 0;
    let mut total_freed: u64 = 0;

    for model in files {
        let path = model_dir.join(model.filename);
        if path.exists() {
            let size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            fs::remove_file(&path)?;
            total_removed += 1;
            total_freed += size;
            println!("  {} Removed {}", style("✓").green(), model.filename);
        }
    }

    // Leftovers from interrupted downloads.
    if let Ok(entries) = fs::read_dir(model_dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().is_some_and(|e| e == "tmp") {
                let _ = fs::remove_file(&path);
            }
        }
    }

    if total_removed > 0 {
        println!();
        println!(
            "{} Removed {} files, freed {}",
            style("✓").green(),
            total_removed,
            format_size(total_freed)
        );
    } else {
        println!("{} No model files to remove.", style("ℹ").blue());
    }

    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.1}GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1}MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1}KB", bytes as f64 / 1_000.0)
    } else {
        format!("{}B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_required_files_for_default_profile() {
        let names: Vec<&str> = required_files(LanguageProfile::default())
            .iter()
            .map(|f| f.filename)
            .collect();

        assert_eq!(
            names,
            vec!["det.onnx", "japan_rec.onnx", "japan_dict.txt", "latin_rec.onnx", "latin_dict.txt"]
        );
    }

    #[test]
    fn test_single_language_profile() {
        let profile = LanguageProfile::new(Language::English, Language::English);
        assert_eq!(required_files(profile).len(), 3);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512B");
        assert_eq!(format_size(4_500_000), "4.5MB");
    }
}
