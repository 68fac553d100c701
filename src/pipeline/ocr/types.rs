use std::path::Path;

use base64::Engine as _;

use super::OcrError;
use crate::pipeline::extraction::Word;

/// Recognized page: word boxes grouped in OCR lines, plus the plain text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OcrPage {
    pub lines: Vec<Vec<Word>>,
    /// Plain text as reported by the service. May be empty.
    pub text: String,
}

impl OcrPage {
    pub fn from_lines(lines: Vec<Vec<Word>>) -> Self {
        Self {
            lines,
            text: String::new(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.lines.iter().map(Vec::len).sum()
    }

    /// Service text, or the OCR lines joined when the service sent none.
    pub fn plain_text(&self) -> String {
        if !self.text.trim().is_empty() {
            return self.text.clone();
        }
        self.lines
            .iter()
            .map(|line| {
                line.iter()
                    .map(|w| w.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Image bytes ready for upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl ImageUpload {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Read an image file, guessing its MIME type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, OcrError> {
        let bytes = std::fs::read(path)?;
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self { bytes, mime })
    }

    /// `data:<mime>;base64,<payload>` form accepted by OCR.space.
    pub fn data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime, encoded)
    }
}

/// OCR backend abstraction (allows mocking for tests)
pub trait OcrProvider {
    fn recognize(&self, image: &ImageUpload) -> Result<OcrPage, OcrError>;
}

/// Mock OCR provider for testing: returns a canned page or a service error.
pub struct MockOcrProvider {
    outcome: Result<OcrPage, String>,
}

impl MockOcrProvider {
    pub fn new(page: OcrPage) -> Self {
        Self { outcome: Ok(page) }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            outcome: Err(message.to_string()),
        }
    }
}

impl OcrProvider for MockOcrProvider {
    fn recognize(&self, _image: &ImageUpload) -> Result<OcrPage, OcrError> {
        self.outcome.clone().map_err(OcrError::Service)
    }
}
