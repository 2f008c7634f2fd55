//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{RcptError, Result};

/// Keywords that mark a line carrying the receipt total.
///
/// Matched case-insensitively as substrings; the first line containing any of
/// them wins regardless of which keyword matched.
pub const DEFAULT_TOTAL_KEYWORDS: &[&str] = &[
    "total amount due",
    "total",
    "visa ending",
    "amount due",
    "grand total",
    "balance due",
    "subtotal",
    "amount charged",
    "payment amount",
    "final total",
];

/// Main configuration for the rcpt pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RcptConfig {
    /// PDF text extraction configuration.
    pub pdf: PdfConfig,

    /// OCR fallback configuration.
    pub ocr: OcrConfig,

    /// Field extraction configuration.
    pub extraction: ExtractionConfig,
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Use the embedded text layer when it is usable.
    pub prefer_embedded_text: bool,

    /// Minimum non-whitespace characters for a text layer to count as usable.
    pub min_text_length: usize,

    /// Maximum pages scanned for OCR images (0 = unlimited).
    pub max_pages: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 1,
            max_pages: 10,
        }
    }
}

/// OCR fallback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run OCR on page images when the text layer is unusable.
    pub enabled: bool,

    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` tokens in recognized text instead of blanking them.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Full paths of the detection model, recognition model and dictionary.
    pub fn model_paths(&self) -> (PathBuf, PathBuf, PathBuf) {
        (
            self.model_dir.join(&self.detection_model),
            self.model_dir.join(&self.recognition_model),
            self.model_dir.join(&self.dictionary),
        )
    }

    /// True when every model file is present on disk.
    pub fn models_available(&self) -> bool {
        let (det, rec, dict) = self.model_paths();
        det.exists() && rec.exists() && dict.exists()
    }
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Keywords marking a total line.
    pub total_keywords: Vec<String>,

    /// Keep searching later keyword lines when the first one carries no amount.
    pub scan_past_unpriced_keyword: bool,

    /// Two-digit years up to this value map to 20xx, above it to 19xx.
    pub two_digit_year_pivot: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            total_keywords: DEFAULT_TOTAL_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            scan_past_unpriced_keyword: false,
            two_digit_year_pivot: 50,
        }
    }
}

impl RcptConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| RcptError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| RcptError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
