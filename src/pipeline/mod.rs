pub mod extraction;
pub mod ocr;
pub mod processor; // Scan pipeline: OCR then extraction
