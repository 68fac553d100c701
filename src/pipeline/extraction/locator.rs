//! Value locator: finds the number printed to the right of a matched label.
//!
//! Candidate rows are the few rows closest to the label vertically. Within
//! them, every numeric-looking word right of the label starts a run of up to
//! `max_fragment_span` joined fragments ("43." + "2", "1," + "234"). Each run
//! that parses is scored by horizontal distance plus a weighted vertical
//! penalty, and the best-scoring run wins.

use std::cmp::Ordering;

use super::labels::LabelMatch;
use super::normalize::{is_numeric_fragment, parse_number};
use super::types::{Row, Word};
use crate::config::ExtractorConfig;

/// A parsed number and how it ranks against other candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueCandidate {
    pub value: f64,
    /// Horizontal distance plus weighted vertical deviation. Lower is better.
    pub score: f64,
    /// Number of word fragments joined to form the value.
    pub span: usize,
    /// Length of the joined raw text.
    pub text_len: usize,
}

/// Best candidate value to the right of `label`, or `None` if nothing parses.
pub fn locate_value(
    rows: &[Row<'_>],
    label: &LabelMatch,
    label_row: &Row<'_>,
    config: &ExtractorConfig,
) -> Option<ValueCandidate> {
    candidate_rows(rows, label.center_y, label_row.height, config)
        .into_iter()
        .flat_map(|(row, delta)| row_candidates(row, delta, label.right, config))
        .min_by(rank)
}

/// Rows within reach of the label's center, closest first, capped at
/// `max_candidate_rows`.
fn candidate_rows<'r, 'w>(
    rows: &'r [Row<'w>],
    label_center_y: f64,
    label_row_height: f64,
    config: &ExtractorConfig,
) -> Vec<(&'r Row<'w>, f64)> {
    let reach = label_row_height.max(config.min_row_height) * config.row_proximity_factor;

    let mut nearby: Vec<(&Row<'w>, f64)> = rows
        .iter()
        .map(|row| (row, (row.center_y - label_center_y).abs()))
        .filter(|(_, delta)| *delta <= reach)
        .collect();
    nearby.sort_by(|a, b| a.1.total_cmp(&b.1));
    nearby.truncate(config.max_candidate_rows);
    nearby
}

/// Every parseable fragment run in one row that starts right of the label.
fn row_candidates(
    row: &Row<'_>,
    row_delta: f64,
    label_right: f64,
    config: &ExtractorConfig,
) -> Vec<ValueCandidate> {
    let mut candidates = Vec::new();

    for (i, first) in row.words.iter().enumerate() {
        if first.left <= label_right || !is_numeric_fragment(&first.text) {
            continue;
        }

        let score = (first.left - label_right) + row_delta * config.vertical_weight;
        let mut combined = first.text.clone();
        let mut last: &Word = *first;

        for span in 1..=config.max_fragment_span {
            if span > 1 {
                let Some(next) = row.words.get(i + span - 1) else {
                    break;
                };
                if !is_numeric_fragment(&next.text) || !is_joinable(last, next, row.height, config) {
                    break;
                }
                combined.push_str(&next.text);
                last = *next;
            }

            // A lone "." or "-" does not parse yet but may once the next
            // fragment is joined, so keep extending.
            if let Some(value) = parse_number(&combined) {
                candidates.push(ValueCandidate {
                    value,
                    score,
                    span,
                    text_len: combined.chars().count(),
                });
            }
        }
    }

    candidates
}

/// Whether `b` continues the number ending in `a`: a small horizontal gap
/// (slight overlap allowed) and nearly the same vertical center.
fn is_joinable(a: &Word, b: &Word, row_height: f64, config: &ExtractorConfig) -> bool {
    let gap = b.left - a.right();
    let max_height = a.height.max(b.height).max(row_height);

    let vertical_ok =
        (a.center_y() - b.center_y()).abs() <= max_height * config.join_vertical_factor;
    let gap_ok = gap >= config.join_gap_min
        && gap <= config.join_gap_floor.max(max_height * config.join_gap_factor);

    vertical_ok && gap_ok
}

/// Lower score first; on equal score prefer the longer span, then the longer text.
fn rank(a: &ValueCandidate, b: &ValueCandidate) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| b.span.cmp(&a.span))
        .then_with(|| b.text_len.cmp(&a.text_len))
}
