use super::labels::{find_label_matches, row_tokens, LabelPattern, LABEL_PATTERNS};
use super::locator::locate_value;
use super::rows::cluster_rows;
use super::types::{BodyComposition, Row, Word};
use crate::config::ExtractorConfig;

/// Result of one extraction pass, with the counts used for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionOutcome {
    pub metrics: BodyComposition,
    /// Non-blank words that went into clustering.
    pub word_count: usize,
    pub row_count: usize,
}

/// Spatial label-value extractor for body-composition reports.
///
/// Stateless apart from its tuning, so one instance can serve any number of
/// documents, including from several threads.
#[derive(Debug, Clone, Default)]
pub struct BodyCompositionExtractor {
    config: ExtractorConfig,
}

impl BodyCompositionExtractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract metrics from OCR lines. Line grouping is ignored; rows are
    /// rebuilt from word geometry.
    pub fn extract(&self, lines: &[Vec<Word>]) -> BodyComposition {
        self.extract_detailed(lines).metrics
    }

    pub fn extract_detailed(&self, lines: &[Vec<Word>]) -> ExtractionOutcome {
        self.extract_words(lines.iter().flatten())
    }

    /// Extract metrics from a flat bag of words.
    pub fn extract_words<'a, I>(&self, words: I) -> ExtractionOutcome
    where
        I: IntoIterator<Item = &'a Word>,
    {
        let _span = tracing::debug_span!("extract_body_composition").entered();

        let words: Vec<&Word> = words.into_iter().filter(|w| !w.is_blank()).collect();
        let word_count = words.len();
        let rows = cluster_rows(words, &self.config);

        let mut metrics = BodyComposition::new();
        for row in &rows {
            let tokens = row_tokens(row);
            for pattern in LABEL_PATTERNS {
                if metrics.contains(pattern.metric) {
                    continue;
                }
                self.resolve_on_row(pattern, row, &tokens, &rows, &mut metrics);
            }
        }

        tracing::info!(
            words = word_count,
            rows = rows.len(),
            metrics_found = metrics.len(),
            "Body composition extraction complete"
        );

        ExtractionOutcome {
            metrics,
            word_count,
            row_count: rows.len(),
        }
    }

    /// Try each phrasing of `pattern` on `row`, longest first, and record the
    /// first label occurrence that has a value next to it.
    fn resolve_on_row(
        &self,
        pattern: &LabelPattern,
        row: &Row<'_>,
        tokens: &[String],
        rows: &[Row<'_>],
        metrics: &mut BodyComposition,
    ) {
        for alternative in pattern.ordered_alternatives() {
            for label in find_label_matches(row, tokens, alternative) {
                let Some(found) = locate_value(rows, &label, row, &self.config) else {
                    continue;
                };
                if metrics.record(pattern.metric, found.value) {
                    tracing::debug!(
                        metric = %pattern.metric,
                        value = found.value,
                        score = found.score,
                        span = found.span,
                        label = %alternative.join(" "),
                        row = %row.text(),
                        "Resolved metric"
                    );
                }
                return;
            }
        }
    }
}

/// Extract metrics with the default thresholds.
pub fn extract_body_composition(lines: &[Vec<Word>]) -> BodyComposition {
    BodyCompositionExtractor::default().extract(lines)
}
