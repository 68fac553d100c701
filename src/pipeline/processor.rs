//! Scan processing: OCR a report image, then extract its metrics.
//!
//! The OCR backend is injected as a trait object so the processor can run
//! against `MockOcrProvider` in tests and the OCR.space client in production.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::pipeline::extraction::{extract_from_text, BodyComposition, BodyCompositionExtractor, Metric};
use crate::pipeline::ocr::{ImageUpload, OcrError, OcrPage, OcrProvider};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Outcome of processing one scanned report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub id: Uuid,
    pub processed_at: DateTime<Utc>,
    pub metrics: BodyComposition,
    /// Metrics neither pass could resolve, in canonical order.
    pub missing: Vec<Metric>,
    /// Metrics that came from the plain-text fallback rather than geometry.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filled_from_text: Vec<Metric>,
    pub word_count: usize,
    pub row_count: usize,
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

pub struct ScanProcessor {
    provider: Box<dyn OcrProvider + Send + Sync>,
    extractor: BodyCompositionExtractor,
    text_fallback: bool,
}

impl ScanProcessor {
    pub fn new(
        provider: Box<dyn OcrProvider + Send + Sync>,
        extractor: BodyCompositionExtractor,
    ) -> Self {
        Self {
            provider,
            extractor,
            text_fallback: false,
        }
    }

    /// Enable the plain-text pass for metrics the spatial pass missed.
    pub fn with_text_fallback(mut self, enabled: bool) -> Self {
        self.text_fallback = enabled;
        self
    }

    /// OCR the image and extract its metrics. OCR failures propagate; an
    /// image without recognizable metrics yields an empty report.
    pub fn process_image(&self, image: &ImageUpload) -> Result<ScanReport, OcrError> {
        let _span = tracing::info_span!("process_scan", mime = %image.mime).entered();

        let page = self.provider.recognize(image)?;
        Ok(process_page(&self.extractor, &page, self.text_fallback))
    }
}

/// Extract metrics from an already recognized page.
pub fn process_page(
    extractor: &BodyCompositionExtractor,
    page: &OcrPage,
    text_fallback: bool,
) -> ScanReport {
    let outcome = extractor.extract_detailed(&page.lines);
    let mut metrics = outcome.metrics;

    let mut filled_from_text = Vec::new();
    if text_fallback && !metrics.missing().is_empty() {
        let from_text = extract_from_text(&page.plain_text());
        filled_from_text = metrics.fill_missing_from(&from_text);
        if !filled_from_text.is_empty() {
            tracing::info!(
                filled = filled_from_text.len(),
                "Text fallback filled missing metrics"
            );
        }
    }

    let missing = metrics.missing();
    if !missing.is_empty() {
        tracing::warn!(
            missing = missing.len(),
            found = metrics.len(),
            "Some body composition metrics were not found"
        );
    }

    ScanReport {
        id: Uuid::new_v4(),
        processed_at: Utc::now(),
        metrics,
        missing,
        filled_from_text,
        word_count: outcome.word_count,
        row_count: outcome.row_count,
    }
}
