//! OCR collaborator: turns a scanned report image into word boxes.
//!
//! The extractor never calls OCR itself. This module owns the OCR.space
//! request, the typed validation of its JSON payload, and the errors either
//! can raise.

pub mod types;
pub mod payload;
pub mod ocr_space;

pub use types::*;
pub use payload::*;
pub use ocr_space::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("OCR service is not reachable at {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("OCR service returned error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Malformed OCR response: {0}")]
    ResponseParsing(String),

    #[error("OCR processing failed: {0}")]
    Service(String),

    #[error("OCR could not parse the file (exit code {code}): {message}")]
    ParseFailed { code: i64, message: String },

    #[error("OCR response contained no parsed results")]
    NoParsedResults,

    #[error("OCR response has no text overlay; word geometry was not returned")]
    MissingOverlay,

    #[error("No OCR API key configured (set {0})")]
    MissingApiKey(&'static str),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
