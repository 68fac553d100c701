use std::time::Duration;

use super::payload::parse_response;
use super::types::{ImageUpload, OcrPage, OcrProvider};
use super::OcrError;
use crate::config::{api_key_from_env, OcrSettings, OCR_KEY_ENV};

/// OCR.space HTTP client. Word overlays are always requested since the
/// extractor works on word geometry.
pub struct OcrSpaceClient {
    endpoint: String,
    api_key: String,
    language: String,
    scale: bool,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl std::fmt::Debug for OcrSpaceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OcrSpaceClient")
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .field("scale", &self.scale)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl OcrSpaceClient {
    pub fn new(api_key: &str, settings: &OcrSettings) -> Result<Self, OcrError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(OcrError::MissingApiKey(OCR_KEY_ENV));
        }
        if settings.timeout_secs == 0 {
            return Err(OcrError::HttpClient(
                "timeout must be at least 1 second".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| OcrError::HttpClient(e.to_string()))?;

        Ok(Self {
            endpoint: settings.endpoint.trim().to_string(),
            api_key: api_key.to_string(),
            language: settings.language.clone(),
            scale: settings.scale,
            timeout_secs: settings.timeout_secs,
            client,
        })
    }

    /// Client keyed from the `OCR_KEY` environment variable.
    pub fn from_env(settings: &OcrSettings) -> Result<Self, OcrError> {
        let key = api_key_from_env().ok_or(OcrError::MissingApiKey(OCR_KEY_ENV))?;
        Self::new(&key, settings)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Form body sent to the service.
    pub fn form_fields(&self, image: &ImageUpload) -> Vec<(&'static str, String)> {
        vec![
            ("base64Image", image.data_uri()),
            ("isOverlayRequired", "true".to_string()),
            ("scale", self.scale.to_string()),
            ("language", self.language.clone()),
        ]
    }
}

impl OcrProvider for OcrSpaceClient {
    fn recognize(&self, image: &ImageUpload) -> Result<OcrPage, OcrError> {
        let _span = tracing::info_span!(
            "ocr_space",
            mime = %image.mime,
            bytes = image.bytes.len()
        )
        .entered();

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .form(&self.form_fields(image))
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    OcrError::Connection(self.endpoint.clone())
                } else if e.is_timeout() {
                    OcrError::HttpClient(format!(
                        "Request timed out after {}s",
                        self.timeout_secs
                    ))
                } else {
                    OcrError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OcrError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .map_err(|e| OcrError::ResponseParsing(e.to_string()))?;
        let page = parse_response(&body)?;

        tracing::info!(
            lines = page.lines.len(),
            words = page.word_count(),
            "OCR.space recognition complete"
        );
        Ok(page)
    }
}
