pub mod config;
pub mod pipeline;

pub use config::{AppConfig, ConfigError, ExtractorConfig, OcrSettings};
pub use pipeline::extraction::{
    extract_body_composition, BodyComposition, BodyCompositionExtractor, Metric, Word,
};
pub use pipeline::ocr::{ImageUpload, OcrError, OcrPage, OcrProvider, OcrSpaceClient};
pub use pipeline::processor::{process_page, ScanProcessor, ScanReport};

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr so stdout stays JSON.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
