use super::normalize::{matches_token, normalize_token};
use super::types::{Metric, Row};

/// Label phrasings for one metric, as normalized token sequences.
#[derive(Debug, Clone, Copy)]
pub struct LabelPattern {
    pub metric: Metric,
    pub alternatives: &'static [&'static [&'static str]],
}

impl LabelPattern {
    /// Alternatives ordered longest first, so "body water" is never tried
    /// before "total body water" gets its chance on the same row.
    pub fn ordered_alternatives(&self) -> Vec<&'static [&'static str]> {
        let mut ordered = self.alternatives.to_vec();
        ordered.sort_by(|a, b| b.len().cmp(&a.len()));
        ordered
    }
}

/// Printed labels of the report, in search order.
pub const LABEL_PATTERNS: &[LabelPattern] = &[
    LabelPattern {
        metric: Metric::TotalBodyWater,
        alternatives: &[&["total", "body", "water"], &["body", "water"]],
    },
    LabelPattern {
        metric: Metric::Protein,
        alternatives: &[&["protein"]],
    },
    LabelPattern {
        metric: Metric::Mineral,
        alternatives: &[&["mineral"]],
    },
    LabelPattern {
        metric: Metric::BodyFatMass,
        alternatives: &[&["body", "fat", "mass"], &["fat", "mass"]],
    },
    LabelPattern {
        metric: Metric::SkeletalMuscleMass,
        alternatives: &[&["skeletal", "muscle", "mass"], &["muscle", "mass"]],
    },
    LabelPattern {
        metric: Metric::Bmi,
        alternatives: &[&["bmi"]],
    },
    LabelPattern {
        metric: Metric::Weight,
        alternatives: &[&["weight"]],
    },
];

/// Where a label phrase was found on a row.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMatch {
    /// Index of the first matched word in the row.
    pub start: usize,
    /// Number of matched words.
    pub len: usize,
    /// Rightmost edge over the matched words.
    pub right: f64,
    /// Mean vertical center of the matched words.
    pub center_y: f64,
}

/// Normalized tokens of a row, index-aligned with `row.words`.
pub fn row_tokens(row: &Row<'_>) -> Vec<String> {
    row.words.iter().map(|w| normalize_token(&w.text)).collect()
}

/// Every position in the row where `pattern` matches a contiguous run of
/// tokens, left to right.
pub fn find_label_matches(row: &Row<'_>, tokens: &[String], pattern: &[&str]) -> Vec<LabelMatch> {
    if pattern.is_empty() || tokens.len() < pattern.len() {
        return Vec::new();
    }

    (0..=tokens.len() - pattern.len())
        .filter(|&start| {
            pattern
                .iter()
                .enumerate()
                .all(|(j, expected)| matches_token(&tokens[start + j], expected))
        })
        .map(|start| label_geometry(row, start, pattern.len()))
        .collect()
}

fn label_geometry(row: &Row<'_>, start: usize, len: usize) -> LabelMatch {
    let matched = &row.words[start..start + len];
    let right = matched
        .iter()
        .map(|w| w.right())
        .fold(f64::NEG_INFINITY, f64::max);
    let center_y = matched.iter().map(|w| w.center_y()).sum::<f64>() / len as f64;

    LabelMatch {
        start,
        len,
        right,
        center_y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extraction::types::Word;

    fn make_row(words: &[Word]) -> Row<'_> {
        let mut row = Row::start(&words[0]);
        for w in &words[1..] {
            row.absorb(w);
        }
        row
    }

    fn pattern_for(metric: Metric) -> &'static LabelPattern {
        LABEL_PATTERNS.iter().find(|p| p.metric == metric).unwrap()
    }

    #[test]
    fn every_metric_has_a_pattern() {
        assert_eq!(LABEL_PATTERNS.len(), Metric::ALL.len());
        for metric in Metric::ALL {
            assert!(LABEL_PATTERNS.iter().any(|p| p.metric == metric), "{metric} missing");
        }
    }

    #[test]
    fn alternatives_ordered_longest_first() {
        for pattern in LABEL_PATTERNS {
            let ordered = pattern.ordered_alternatives();
            assert!(ordered.windows(2).all(|w| w[0].len() >= w[1].len()));
        }
        let water = pattern_for(Metric::TotalBodyWater).ordered_alternatives();
        assert_eq!(water[0], &["total", "body", "water"]);
    }

    #[test]
    fn finds_multi_word_label_with_geometry() {
        let words = vec![
            Word::new("Total", 10.0, 10.0, 45.0, 20.0),
            Word::new("Body", 60.0, 12.0, 45.0, 20.0),
            Word::new("Water", 110.0, 14.0, 45.0, 20.0),
        ];
        let row = make_row(&words);
        let tokens = row_tokens(&row);

        let matches = find_label_matches(&row, &tokens, &["total", "body", "water"]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 0);
        assert_eq!(matches[0].len, 3);
        assert_eq!(matches[0].right, 155.0);
        assert!((matches[0].center_y - 22.0).abs() < 1e-9);
    }

    #[test]
    fn shorter_alternative_matches_inside_longer_label() {
        let words = vec![
            Word::new("Total", 10.0, 10.0, 45.0, 20.0),
            Word::new("Body", 60.0, 10.0, 45.0, 20.0),
            Word::new("Water", 110.0, 10.0, 45.0, 20.0),
        ];
        let row = make_row(&words);
        let tokens = row_tokens(&row);
        let matches = find_label_matches(&row, &tokens, &["body", "water"]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 1);
    }

    #[test]
    fn punctuation_and_case_ignored() {
        let words = vec![Word::new("PROTEIN:", 0.0, 0.0, 60.0, 12.0)];
        let row = make_row(&words);
        let tokens = row_tokens(&row);
        assert_eq!(find_label_matches(&row, &tokens, &["protein"]).len(), 1);
    }

    #[test]
    fn truncated_ocr_token_matches() {
        let words = vec![
            Word::new("Skeletal", 0.0, 0.0, 60.0, 12.0),
            Word::new("Musc", 70.0, 0.0, 40.0, 12.0),
            Word::new("Mass", 120.0, 0.0, 40.0, 12.0),
        ];
        let row = make_row(&words);
        let tokens = row_tokens(&row);
        assert_eq!(
            find_label_matches(&row, &tokens, &["skeletal", "muscle", "mass"]).len(),
            1
        );
    }

    #[test]
    fn non_contiguous_tokens_do_not_match() {
        let words = vec![
            Word::new("Body", 0.0, 0.0, 40.0, 12.0),
            Word::new("Fat", 50.0, 0.0, 30.0, 12.0),
            Word::new("Percent", 90.0, 0.0, 60.0, 12.0),
            Word::new("Mass", 160.0, 0.0, 40.0, 12.0),
        ];
        let row = make_row(&words);
        let tokens = row_tokens(&row);
        assert_eq!(find_label_matches(&row, &tokens, &["body", "fat", "mass"]).len(), 0);
    }

    #[test]
    fn pattern_longer_than_row_yields_nothing() {
        let words = vec![Word::new("Water", 0.0, 0.0, 40.0, 12.0)];
        let row = make_row(&words);
        let tokens = row_tokens(&row);
        assert_eq!(
            find_label_matches(&row, &tokens, &["total", "body", "water"]).len(),
            0
        );
    }

    #[test]
    fn repeated_label_reported_at_each_position() {
        let words = vec![
            Word::new("Weight", 0.0, 0.0, 50.0, 12.0),
            Word::new("72.4", 60.0, 0.0, 30.0, 12.0),
            Word::new("Weight", 200.0, 0.0, 50.0, 12.0),
        ];
        let row = make_row(&words);
        let tokens = row_tokens(&row);
        let starts: Vec<usize> = find_label_matches(&row, &tokens, &["weight"])
            .iter()
            .map(|m| m.start)
            .collect();
        assert_eq!(starts, vec![0, 2]);
    }
}
