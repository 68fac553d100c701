use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single OCR-recognized token with its pixel bounding box.
///
/// Origin is top-left, y grows downward. The extractor only reads words.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    pub text: String,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Word {
    pub fn new(text: impl Into<String>, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            text: text.into(),
            left,
            top,
            width,
            height,
        }
    }

    pub fn center_y(&self) -> f64 {
        self.top + self.height / 2.0
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Whitespace-only words carry nothing to match and are dropped before clustering.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Words judged to lie on the same visual line.
///
/// `center_y` is the running mean of member centers, `height` the tallest
/// member. Words are ordered left to right once the row is closed.
#[derive(Debug, Clone)]
pub struct Row<'a> {
    pub center_y: f64,
    pub height: f64,
    pub words: Vec<&'a Word>,
}

impl<'a> Row<'a> {
    pub(crate) fn start(word: &'a Word) -> Self {
        Self {
            center_y: word.center_y(),
            height: word.height,
            words: vec![word],
        }
    }

    pub(crate) fn absorb(&mut self, word: &'a Word) {
        let count = self.words.len() as f64;
        self.center_y = (self.center_y * count + word.center_y()) / (count + 1.0);
        self.height = self.height.max(word.height);
        self.words.push(word);
    }

    /// Row text left to right, space separated.
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Body-composition metrics printed on the report.
///
/// Declaration order is the order metrics are searched and serialized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    TotalBodyWater,
    Protein,
    Mineral,
    BodyFatMass,
    SkeletalMuscleMass,
    Bmi,
    Weight,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::TotalBodyWater,
        Metric::Protein,
        Metric::Mineral,
        Metric::BodyFatMass,
        Metric::SkeletalMuscleMass,
        Metric::Bmi,
        Metric::Weight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::TotalBodyWater => "totalBodyWater",
            Metric::Protein => "protein",
            Metric::Mineral => "mineral",
            Metric::BodyFatMass => "bodyFatMass",
            Metric::SkeletalMuscleMass => "skeletalMuscleMass",
            Metric::Bmi => "bmi",
            Metric::Weight => "weight",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial mapping of metric to value.
///
/// A metric is present only once a value was found for it, and the first
/// recorded value is kept for the rest of the extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyComposition {
    values: BTreeMap<Metric, f64>,
}

impl BodyComposition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied()
    }

    pub fn contains(&self, metric: Metric) -> bool {
        self.values.contains_key(&metric)
    }

    /// Store `value` for `metric` unless one is already set.
    /// Returns whether the value was stored.
    pub fn record(&mut self, metric: Metric, value: f64) -> bool {
        if !value.is_finite() {
            return false;
        }
        match self.values.entry(metric) {
            Entry::Vacant(slot) => {
                slot.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Copy values for metrics still unset here. Returns the metrics filled.
    pub fn fill_missing_from(&mut self, other: &BodyComposition) -> Vec<Metric> {
        other
            .iter()
            .filter(|(metric, value)| self.record(*metric, *value))
            .map(|(metric, _)| metric)
            .collect()
    }

    pub fn missing(&self) -> Vec<Metric> {
        Metric::ALL
            .iter()
            .copied()
            .filter(|m| !self.contains(*m))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Metric, f64)> + '_ {
        self.values.iter().map(|(m, v)| (*m, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_geometry() {
        let w = Word::new("35.5", 300.0, 40.0, 30.0, 20.0);
        assert_eq!(w.center_y(), 50.0);
        assert_eq!(w.right(), 330.0);
    }

    #[test]
    fn blank_words_detected() {
        assert!(Word::new("   ", 0.0, 0.0, 1.0, 1.0).is_blank());
        assert!(Word::new("", 0.0, 0.0, 1.0, 1.0).is_blank());
        assert!(!Word::new(" a ", 0.0, 0.0, 1.0, 1.0).is_blank());
    }

    #[test]
    fn row_text_joins_words_in_order() {
        let total = Word::new("Total", 10.0, 0.0, 45.0, 20.0);
        let body = Word::new("Body", 60.0, 2.0, 45.0, 20.0);
        let mut row = Row::start(&total);
        row.absorb(&body);
        assert_eq!(row.text(), "Total Body");
        assert!((row.center_y - 11.0).abs() < 1e-9);
    }

    #[test]
    fn record_keeps_first_value() {
        let mut result = BodyComposition::new();
        assert!(result.record(Metric::Weight, 72.4));
        assert!(!result.record(Metric::Weight, 80.0));
        assert_eq!(result.get(Metric::Weight), Some(72.4));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn record_rejects_non_finite() {
        let mut result = BodyComposition::new();
        assert!(!result.record(Metric::Bmi, f64::NAN));
        assert!(!result.record(Metric::Bmi, f64::INFINITY));
        assert!(result.is_empty());
    }

    #[test]
    fn missing_lists_unset_metrics_in_order() {
        let mut result = BodyComposition::new();
        result.record(Metric::Protein, 9.8);
        let missing = result.missing();
        assert_eq!(missing.len(), 6);
        assert_eq!(missing[0], Metric::TotalBodyWater);
        assert!(!missing.contains(&Metric::Protein));
    }

    #[test]
    fn fill_missing_does_not_overwrite() {
        let mut spatial = BodyComposition::new();
        spatial.record(Metric::Weight, 72.4);
        let mut text = BodyComposition::new();
        text.record(Metric::Weight, 99.9);
        text.record(Metric::Bmi, 23.1);

        let filled = spatial.fill_missing_from(&text);
        assert_eq!(filled, vec![Metric::Bmi]);
        assert_eq!(spatial.get(Metric::Weight), Some(72.4));
        assert_eq!(spatial.get(Metric::Bmi), Some(23.1));
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut result = BodyComposition::new();
        result.record(Metric::SkeletalMuscleMass, 30.2);
        result.record(Metric::TotalBodyWater, 35.5);
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(json, r#"{"totalBodyWater":35.5,"skeletalMuscleMass":30.2}"#);
    }

    #[test]
    fn deserializes_from_camel_case_keys() {
        let result: BodyComposition = serde_json::from_str(r#"{"bmi":23.1,"bodyFatMass":14.0}"#).unwrap();
        assert_eq!(result.get(Metric::Bmi), Some(23.1));
        assert_eq!(result.get(Metric::BodyFatMass), Some(14.0));
    }

    #[test]
    fn metric_display_matches_serialized_key() {
        for metric in Metric::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{metric}\""));
        }
    }
}
