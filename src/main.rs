//! bodyscan - extract body-composition metrics from scanned InBody-style reports.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use bodyscan_lib::config::{self, AppConfig};
use bodyscan_lib::pipeline::extraction::BodyCompositionExtractor;
use bodyscan_lib::pipeline::ocr::{parse_payload, ImageUpload, OcrSpaceClient};
use bodyscan_lib::pipeline::processor::{process_page, ScanProcessor, ScanReport};

#[derive(Parser, Debug)]
#[command(name = "bodyscan", version)]
#[command(about = "Extract body-composition metrics from OCR word boxes")]
struct Args {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Fill metrics missed by the spatial pass from the OCR plain text
    #[arg(long, global = true)]
    text_fallback: bool,

    /// Pretty-print the JSON report
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract from a saved OCR.space response or a JSON array of word lines
    Extract {
        /// JSON payload file
        payload: PathBuf,
    },
    /// Send an image to OCR.space and extract from the result
    Scan {
        /// Report image (JPEG, PNG, ...)
        image: PathBuf,

        /// OCR.space API key (defaults to the OCR_KEY environment variable)
        #[arg(long)]
        api_key: Option<String>,
    },
}

fn main() -> Result<()> {
    bodyscan_lib::init_tracing();
    let args = Args::parse();

    let app_config = load_config(args.config.as_deref())?;
    let text_fallback = args.text_fallback || app_config.text_fallback;
    let extractor = BodyCompositionExtractor::new(app_config.extractor.clone());

    tracing::info!("bodyscan v{}", config::APP_VERSION);

    let report = match &args.command {
        Command::Extract { payload } => {
            let raw = std::fs::read_to_string(payload)
                .with_context(|| format!("Failed to read payload {}", payload.display()))?;
            let page = parse_payload(&raw)
                .with_context(|| format!("Invalid OCR payload in {}", payload.display()))?;
            process_page(&extractor, &page, text_fallback)
        }
        Command::Scan { image, api_key } => {
            let client = match api_key {
                Some(key) => OcrSpaceClient::new(key, &app_config.ocr)?,
                None => OcrSpaceClient::from_env(&app_config.ocr)?,
            };
            let upload = ImageUpload::from_path(image)
                .with_context(|| format!("Failed to read image {}", image.display()))?;
            ScanProcessor::new(Box::new(client), extractor)
                .with_text_fallback(text_fallback)
                .process_image(&upload)
                .context("Scan failed")?
        }
    };

    print_report(&report, args.pretty)
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::default(),
    };
    Ok(config.apply_env(|key| std::env::var(key).ok()))
}

fn print_report(report: &ScanReport, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(report)?
    } else {
        serde_json::to_string(report)?
    };
    println!("{json}");
    Ok(())
}
