// Visual row clustering for OCR word boxes.
// The line grouping reported by OCR is unreliable on scanned forms, so rows
// are rebuilt from geometry: words are walked in vertical-center order and
// greedily merged into the current row while their center stays within a
// height-relative tolerance of the row's running mean.

use std::cmp::Ordering;

use super::types::{Row, Word};
use crate::config::ExtractorConfig;

/// Group words into rows ordered top to bottom, each row ordered left to right.
pub fn cluster_rows<'a, I>(words: I, config: &ExtractorConfig) -> Vec<Row<'a>>
where
    I: IntoIterator<Item = &'a Word>,
{
    let mut sorted: Vec<&Word> = words.into_iter().collect();
    sorted.sort_by(|a, b| scan_order(a, b));

    let mut rows: Vec<Row<'a>> = Vec::new();
    for word in sorted {
        match rows.last_mut() {
            Some(current) if belongs_to_row(&*current, word, config) => current.absorb(word),
            _ => rows.push(Row::start(word)),
        }
    }

    for row in &mut rows {
        row.words.sort_by(|a, b| reading_order(a, b));
    }

    rows
}

/// Whether `word` sits on the same visual line as `row`.
fn belongs_to_row(row: &Row<'_>, word: &Word, config: &ExtractorConfig) -> bool {
    let tolerance = row.height.max(word.height) * config.row_tolerance_factor;
    (word.center_y() - row.center_y).abs() <= tolerance
}

/// Vertical center first; ties broken on position and text so that the
/// clustering does not depend on input order.
fn scan_order(a: &Word, b: &Word) -> Ordering {
    a.center_y()
        .total_cmp(&b.center_y())
        .then_with(|| a.left.total_cmp(&b.left))
        .then_with(|| a.text.cmp(&b.text))
}

fn reading_order(a: &Word, b: &Word) -> Ordering {
    a.left
        .total_cmp(&b.left)
        .then_with(|| a.top.total_cmp(&b.top))
        .then_with(|| a.text.cmp(&b.text))
}
