// Plain-text fallback for reports whose word geometry is unusable.
// Looks for "<label> <decimal>" in the flat OCR text. Only decimals with a
// fractional part are accepted, which keeps reference ranges and ages out.

use regex::Regex;

use super::labels::LABEL_PATTERNS;
use super::types::BodyComposition;

/// First ASCII decimal following `label` in `text`, case-insensitive.
/// Words of a multi-word label may be separated by any whitespace.
pub fn extract_value(text: &str, label: &str) -> Option<f64> {
    let words: Vec<String> = label.split_whitespace().map(regex::escape).collect();
    if words.is_empty() {
        return None;
    }

    let pattern = format!(r"(?i){}\s*([0-9]+\.[0-9]+)", words.join(r"\s+"));
    let regex = Regex::new(&pattern).ok()?;
    let captures = regex.captures(text)?;
    captures.get(1)?.as_str().parse::<f64>().ok()
}

/// Metrics found in plain text, trying each metric's phrasings longest first.
pub fn extract_from_text(text: &str) -> BodyComposition {
    let mut metrics = BodyComposition::new();
    for pattern in LABEL_PATTERNS {
        for alternative in pattern.ordered_alternatives() {
            if let Some(value) = extract_value(text, &alternative.join(" ")) {
                metrics.record(pattern.metric, value);
                break;
            }
        }
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::types::Metric;

    #[test]
    fn finds_decimal_after_label() {
        assert_eq!(extract_value("Protein 9.6 kg", "protein"), Some(9.6));
        assert_eq!(extract_value("PROTEIN9.6", "protein"), Some(9.6));
    }

    #[test]
    fn multi_word_label_spans_line_breaks() {
        let text = "Total Body\nWater 35.5 L";
        assert_eq!(extract_value(text, "total body water"), Some(35.5));
    }

    #[test]
    fn integers_not_accepted() {
        assert_eq!(extract_value("Weight 72 kg", "weight"), None);
    }

    #[test]
    fn non_ascii_digits_skipped() {
        let text = "Weight \u{0661}.\u{0665} kg Weight 72.4";
        assert_eq!(extract_value(text, "weight"), Some(72.4));
    }

    #[test]
    fn label_must_be_followed_by_number() {
        assert_eq!(extract_value("Weight Control -3.5", "weight"), None);
    }

    #[test]
    fn label_text_is_escaped() {
        assert_eq!(extract_value("BMI(kg/m2) 23.4", "bmi(kg/m2)"), Some(23.4));
        assert_eq!(extract_value("BMI 23.4", "b.i"), None);
    }

    #[test]
    fn blank_label_matches_nothing() {
        assert_eq!(extract_value("35.5", "   "), None);
    }

    #[test]
    fn extracts_report_metrics() {
        let text = "Total Body Water 35.5\nProtein 9.6\nMineral 3.41\n\
                    Body Fat Mass 14.2\nSkeletal Muscle Mass 30.1\nBMI 23.4\nWeight 72.4";
        let result = extract_from_text(text);
        assert_eq!(result.get(Metric::TotalBodyWater), Some(35.5));
        assert_eq!(result.get(Metric::Protein), Some(9.6));
        assert_eq!(result.get(Metric::Mineral), Some(3.41));
        assert_eq!(result.get(Metric::BodyFatMass), Some(14.2));
        assert_eq!(result.get(Metric::SkeletalMuscleMass), Some(30.1));
        assert_eq!(result.get(Metric::Bmi), Some(23.4));
        assert_eq!(result.get(Metric::Weight), Some(72.4));
    }

    #[test]
    fn shorter_phrase_used_when_long_absent() {
        let result = extract_from_text("Fat Mass 12.5");
        assert_eq!(result.get(Metric::BodyFatMass), Some(12.5));
    }

    #[test]
    fn empty_text_gives_empty_result() {
        assert!(extract_from_text("").is_empty());
    }
}
