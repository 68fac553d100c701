use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "bodyscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable holding the OCR.space API key.
pub const OCR_KEY_ENV: &str = "OCR_KEY";

/// Environment variable overriding the OCR endpoint (self-hosted or PRO plans).
pub const OCR_ENDPOINT_ENV: &str = "OCR_ENDPOINT";

pub const DEFAULT_OCR_ENDPOINT: &str = "https://api.ocr.space/parse/image";

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "bodyscan_lib=info,bodyscan=info"
}

/// Read the OCR API key from the environment. Empty values count as unset.
pub fn api_key_from_env() -> Option<String> {
    std::env::var(OCR_KEY_ENV)
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ═══════════════════════════════════════════════════════════
// Extractor tuning
// ═══════════════════════════════════════════════════════════

/// Geometric thresholds of the label-value extractor.
///
/// Defaults are calibrated for flat-scanned InBody result sheets; every field
/// is optional in the `[extractor]` table of a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Row merge tolerance, as a fraction of the taller of row and word height.
    pub row_tolerance_factor: f64,
    /// Vertical reach of the value search, as a multiple of the label row height.
    pub row_proximity_factor: f64,
    /// Floor applied to the label row height before computing the reach.
    pub min_row_height: f64,
    /// How many of the closest rows are searched for a value.
    pub max_candidate_rows: usize,
    /// Maximum number of word fragments joined into one number.
    pub max_fragment_span: usize,
    /// Score penalty per pixel of vertical deviation between label and value rows.
    pub vertical_weight: f64,
    /// Smallest horizontal gap (negative means overlap) still joinable.
    pub join_gap_min: f64,
    /// Largest joinable gap is at least this many pixels...
    pub join_gap_floor: f64,
    /// ...or this fraction of the fragment height, whichever is larger.
    pub join_gap_factor: f64,
    /// Joined fragments' centers may differ by this fraction of their height.
    pub join_vertical_factor: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            row_tolerance_factor: 0.7,
            row_proximity_factor: 1.2,
            min_row_height: 10.0,
            max_candidate_rows: 3,
            max_fragment_span: 3,
            vertical_weight: 8.0,
            join_gap_min: -1.0,
            join_gap_floor: 8.0,
            join_gap_factor: 0.65,
            join_vertical_factor: 0.6,
        }
    }
}

impl ExtractorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("row_tolerance_factor", self.row_tolerance_factor),
            ("row_proximity_factor", self.row_proximity_factor),
            ("min_row_height", self.min_row_height),
            ("join_gap_factor", self.join_gap_factor),
            ("join_vertical_factor", self.join_vertical_factor),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a positive number, got {value}"),
                });
            }
        }

        let finite = [
            ("vertical_weight", self.vertical_weight),
            ("join_gap_min", self.join_gap_min),
            ("join_gap_floor", self.join_gap_floor),
        ];
        for (field, value) in finite {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite, got {value}"),
                });
            }
        }

        if self.vertical_weight < 0.0 {
            return Err(ConfigError::Invalid {
                field: "vertical_weight",
                reason: "must not be negative".into(),
            });
        }
        if self.join_gap_floor < self.join_gap_min {
            return Err(ConfigError::Invalid {
                field: "join_gap_floor",
                reason: format!("must be at least join_gap_min ({})", self.join_gap_min),
            });
        }
        if self.max_candidate_rows == 0 {
            return Err(ConfigError::Invalid {
                field: "max_candidate_rows",
                reason: "must be at least 1".into(),
            });
        }
        if self.max_fragment_span == 0 {
            return Err(ConfigError::Invalid {
                field: "max_fragment_span",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// OCR service settings
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    pub endpoint: String,
    pub timeout_secs: u64,
    /// OCR.space language code.
    pub language: String,
    /// Ask the service to upscale low-resolution scans before recognition.
    pub scale: bool,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OCR_ENDPOINT.to_string(),
            timeout_secs: 60,
            language: "eng".to_string(),
            scale: true,
        }
    }
}

impl OcrSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "timeout_secs",
                reason: "must be at least 1 second".into(),
            });
        }
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "endpoint",
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Application config
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub extractor: ExtractorConfig,
    pub ocr: OcrSettings,
    /// Fill metrics the spatial pass missed from the OCR plain text.
    pub text_fallback: bool,
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(raw)?;
        config.extractor.validate()?;
        config.ocr.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup(OCR_ENDPOINT_ENV).filter(|e| !e.trim().is_empty()) {
            self.ocr.endpoint = endpoint.trim().to_string();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_bodyscan() {
        assert_eq!(APP_NAME, "bodyscan");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn default_extractor_config_is_valid() {
        assert!(ExtractorConfig::default().validate().is_ok());
    }

    #[test]
    fn default_thresholds() {
        let config = ExtractorConfig::default();
        assert!((config.row_tolerance_factor - 0.7).abs() < f64::EPSILON);
        assert!((config.row_proximity_factor - 1.2).abs() < f64::EPSILON);
        assert_eq!(config.max_candidate_rows, 3);
        assert_eq!(config.max_fragment_span, 3);
        assert!((config.vertical_weight - 8.0).abs() < f64::EPSILON);
        assert!((config.join_gap_min + 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(!config.text_fallback);
        assert_eq!(config.ocr.endpoint, DEFAULT_OCR_ENDPOINT);
    }

    #[test]
    fn partial_extractor_table_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            "text_fallback = true\n[extractor]\nvertical_weight = 4.0\n[ocr]\nlanguage = \"ger\"\n",
        )
        .unwrap();
        assert!(config.text_fallback);
        assert!((config.extractor.vertical_weight - 4.0).abs() < f64::EPSILON);
        assert_eq!(config.extractor.max_fragment_span, 3);
        assert_eq!(config.ocr.language, "ger");
        assert_eq!(config.ocr.timeout_secs, 60);
    }

    #[test]
    fn rejects_non_positive_factor() {
        let err = AppConfig::from_toml_str("[extractor]\nrow_tolerance_factor = 0.0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "row_tolerance_factor",
                ..
            }
        ));
    }

    #[test]
    fn rejects_zero_span() {
        let err = AppConfig::from_toml_str("[extractor]\nmax_fragment_span = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "max_fragment_span", .. }));
    }

    #[test]
    fn rejects_inverted_gap_bounds() {
        let config = ExtractorConfig {
            join_gap_min: 10.0,
            join_gap_floor: 5.0,
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = AppConfig::from_toml_str("[ocr]\ntimeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "timeout_secs", .. }));
    }

    #[test]
    fn rejects_blank_endpoint() {
        let err = AppConfig::from_toml_str("[ocr]\nendpoint = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "endpoint", .. }));
    }

    #[test]
    fn default_ocr_settings_are_valid() {
        assert!(OcrSettings::default().validate().is_ok());
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = AppConfig::from_toml_str("[extractor\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bodyscan.toml");
        std::fs::write(&path, "[ocr]\ntimeout_secs = 15\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.ocr.timeout_secs, 15);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn endpoint_override_from_env() {
        let config = AppConfig::default().apply_env(|key| {
            (key == OCR_ENDPOINT_ENV).then(|| "http://localhost:8080/parse/image ".to_string())
        });
        assert_eq!(config.ocr.endpoint, "http://localhost:8080/parse/image");
    }

    #[test]
    fn blank_endpoint_override_ignored() {
        let config = AppConfig::default().apply_env(|_| Some("  ".to_string()));
        assert_eq!(config.ocr.endpoint, DEFAULT_OCR_ENDPOINT);
    }
}
