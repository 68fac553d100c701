//! Typed boundary for OCR.space responses.
//!
//! The service payload is loosely shaped: numbers may be missing, error
//! messages come as a string or a list, and a failed parse still returns
//! HTTP 200. Everything is deserialized leniently here and then validated
//! into strict `Word`s before it reaches the extractor.

use serde::Deserialize;

use super::types::OcrPage;
use super::OcrError;
use crate::pipeline::extraction::Word;

/// `FileParseExitCode` reported for a successfully parsed file.
const PARSE_SUCCESS: i64 = 1;

/// Top-level OCR.space response body.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OcrSpaceResponse {
    #[serde(default)]
    pub parsed_results: Option<Vec<ParsedResult>>,
    #[serde(default)]
    pub is_errored_on_processing: bool,
    #[serde(default)]
    pub error_message: Option<ErrorMessage>,
    #[serde(default)]
    pub error_details: Option<String>,
}

/// Per-file result. Only the first one is used: reports are single page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ParsedResult {
    #[serde(default)]
    pub text_overlay: Option<TextOverlay>,
    #[serde(default)]
    pub file_parse_exit_code: Option<i64>,
    #[serde(default)]
    pub parsed_text: Option<String>,
    #[serde(default)]
    pub error_message: Option<ErrorMessage>,
    #[serde(default)]
    pub error_details: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TextOverlay {
    /// `null` when the service returned no overlay.
    #[serde(default)]
    pub lines: Option<Vec<OverlayLine>>,
    #[serde(default)]
    pub has_overlay: Option<bool>,
}

impl TextOverlay {
    /// Overlay lines, or `None` when the service says there is no overlay.
    pub fn into_lines(self) -> Option<Vec<OverlayLine>> {
        if self.has_overlay == Some(false) {
            return None;
        }
        self.lines
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OverlayLine {
    #[serde(default)]
    pub words: Option<Vec<OverlayWord>>,
}

/// Raw word box. Every field may be absent or malformed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OverlayWord {
    #[serde(default)]
    pub word_text: Option<String>,
    #[serde(default)]
    pub left: Option<f64>,
    #[serde(default)]
    pub top: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
}

/// OCR.space reports errors either as one string or as a list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorMessage {
    One(String),
    Many(Vec<String>),
}

impl ErrorMessage {
    /// Non-empty messages joined, or `None` when there is nothing to say.
    pub fn text(&self) -> Option<String> {
        let joined = match self {
            ErrorMessage::One(message) => message.trim().to_string(),
            ErrorMessage::Many(messages) => messages
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
        };
        (!joined.is_empty()).then_some(joined)
    }
}

impl OverlayWord {
    /// Strict word, or `None` when text is blank or geometry is missing,
    /// negative or non-finite.
    pub fn to_word(&self) -> Option<Word> {
        let text = self.word_text.as_deref().filter(|t| !t.trim().is_empty())?;
        Some(Word::new(
            text,
            extent(self.left)?,
            extent(self.top)?,
            extent(self.width)?,
            extent(self.height)?,
        ))
    }
}

fn extent(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v >= 0.0)
}

/// Validate raw overlay lines into word lines. Invalid words are dropped,
/// and lines left empty are dropped with them.
pub fn validate_lines(lines: &[Vec<OverlayWord>]) -> Vec<Vec<Word>> {
    let mut dropped = 0usize;
    let validated: Vec<Vec<Word>> = lines
        .iter()
        .map(|line| {
            line.iter()
                .filter_map(|raw| {
                    let word = raw.to_word();
                    if word.is_none() {
                        dropped += 1;
                    }
                    word
                })
                .collect::<Vec<_>>()
        })
        .filter(|line| !line.is_empty())
        .collect();

    if dropped > 0 {
        tracing::debug!(dropped, "Dropped malformed OCR words");
    }
    validated
}

impl OcrSpaceResponse {
    /// Check the service status and validate the first parsed result.
    pub fn into_page(self) -> Result<OcrPage, OcrError> {
        if self.is_errored_on_processing {
            let message = self
                .error_message
                .as_ref()
                .and_then(ErrorMessage::text)
                .or(self.error_details.filter(|d| !d.trim().is_empty()))
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(OcrError::Service(message));
        }

        let first = self
            .parsed_results
            .and_then(|results| results.into_iter().next())
            .ok_or(OcrError::NoParsedResults)?;

        if first.file_parse_exit_code != Some(PARSE_SUCCESS) {
            let message = first
                .error_message
                .as_ref()
                .and_then(ErrorMessage::text)
                .or(first.error_details.filter(|d| !d.trim().is_empty()))
                .unwrap_or_else(|| "file could not be parsed".to_string());
            return Err(OcrError::ParseFailed {
                code: first.file_parse_exit_code.unwrap_or(0),
                message,
            });
        }

        let lines = first
            .text_overlay
            .and_then(TextOverlay::into_lines)
            .ok_or(OcrError::MissingOverlay)?;
        let raw_lines: Vec<Vec<OverlayWord>> = lines
            .into_iter()
            .map(|line| line.words.unwrap_or_default())
            .collect();

        Ok(OcrPage {
            lines: validate_lines(&raw_lines),
            text: first.parsed_text.unwrap_or_default(),
        })
    }
}

/// Parse an OCR.space response body.
pub fn parse_response(json: &str) -> Result<OcrPage, OcrError> {
    let response: OcrSpaceResponse =
        serde_json::from_str(json).map_err(|e| OcrError::ResponseParsing(e.to_string()))?;
    response.into_page()
}

/// Parse either a full OCR.space response or a bare array of word lines
/// (`[[{"WordText": ..., "Left": ...}, ...], ...]`).
pub fn parse_payload(json: &str) -> Result<OcrPage, OcrError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| OcrError::ResponseParsing(e.to_string()))?;

    if value.is_array() {
        let raw: Vec<Vec<OverlayWord>> = serde_json::from_value(value)
            .map_err(|e| OcrError::ResponseParsing(e.to_string()))?;
        return Ok(OcrPage::from_lines(validate_lines(&raw)));
    }

    let response: OcrSpaceResponse =
        serde_json::from_value(value).map_err(|e| OcrError::ResponseParsing(e.to_string()))?;
    response.into_page()
}
