//! Documents and the text sources that read them.
//!
//! A [`TextSource`] turns a document into raw text and never fails: anything
//! that goes wrong while reading is logged and reported as empty text, which
//! the pipeline treats as "nothing to extract".

use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::config::{OcrConfig, PdfConfig};
use crate::ocr::ImageOcr;
use crate::pdf::{PdfExtractor, PdfProcessor};

/// A receipt document: a file on disk or bytes received from an upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    /// File on the local file system.
    File(PathBuf),
    /// Uploaded content with its original file name.
    Upload { name: String, bytes: Vec<u8> },
}

impl Document {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn upload(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self::Upload {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Display name used in logs.
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::File(path) => path.to_string_lossy(),
            Self::Upload { name, .. } => Cow::Borrowed(name),
        }
    }

    /// Document content.
    pub fn bytes(&self) -> Result<Cow<'_, [u8]>> {
        match self {
            Self::File(path) => Ok(Cow::Owned(fs::read(path)?)),
            Self::Upload { bytes, .. } => Ok(Cow::Borrowed(bytes)),
        }
    }

    /// List the `*.pdf` files directly inside `dir`, sorted by file name.
    ///
    /// The extension check ignores case; subdirectories are not entered.
    pub fn scan_dir(dir: &Path) -> Result<Vec<Document>> {
        let mut paths = Vec::new();

        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_pdf_extension(&path) {
                paths.push(path);
            }
        }

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!("Found {} PDF files in {}", paths.len(), dir.display());

        Ok(paths.into_iter().map(Document::File).collect())
    }
}

/// True for paths ending in `.pdf`, any case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Best-effort document-to-text conversion.
pub trait TextSource {
    /// Text of the document, or an empty string if none could be read.
    fn extract_text(&self, document: &Document) -> String;
}

impl<F> TextSource for F
where
    F: Fn(&Document) -> String,
{
    fn extract_text(&self, document: &Document) -> String {
        self(document)
    }
}

/// Reads the PDF text layer, falling back to OCR on page images.
pub struct PdfTextSource {
    pdf: PdfConfig,
    ocr: Option<Box<dyn ImageOcr>>,
}

impl PdfTextSource {
    /// Text-layer only source.
    pub fn new(pdf: PdfConfig) -> Self {
        Self { pdf, ocr: None }
    }

    /// Use `ocr` for pages whose text layer is unusable.
    pub fn with_ocr(mut self, ocr: Box<dyn ImageOcr>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    /// Build a source from settings, loading the OCR engine when the `ocr`
    /// feature is compiled in, OCR is enabled and the models exist.
    pub fn from_config(pdf: &PdfConfig, ocr: &OcrConfig) -> Self {
        let source = Self::new(pdf.clone());
        if !ocr.enabled {
            return source;
        }

        #[cfg(feature = "ocr")]
        {
            if ocr.models_available() {
                match crate::ocr::PureOcrEngine::from_config(ocr) {
                    Ok(engine) => return source.with_ocr(Box::new(engine)),
                    Err(e) => warn!("OCR fallback disabled: {}", e),
                }
            } else {
                debug!("OCR models not found in {}", ocr.model_dir.display());
            }
        }

        source
    }

    /// True when an OCR engine is attached.
    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// Read the document, surfacing failures.
    pub fn try_extract(&self, document: &Document) -> Result<String> {
        let data = document.bytes()?;
        let extractor = PdfExtractor::from_bytes(&data)?;

        let text = if self.pdf.prefer_embedded_text {
            match extractor.extract_text() {
                Ok(text) => text,
                Err(e) => {
                    warn!("Text layer unreadable in {}: {}", document.name(), e);
                    String::new()
                }
            }
        } else {
            String::new()
        };

        if meaningful_len(&text) >= self.pdf.min_text_length.max(1) {
            return Ok(text);
        }

        let Some(ocr) = &self.ocr else {
            return Ok(text);
        };

        info!("No usable text layer in {}, running OCR", document.name());
        let ocr_text = self.ocr_pages(&extractor, ocr.as_ref(), document);
        if ocr_text.trim().is_empty() {
            Ok(text)
        } else {
            Ok(ocr_text)
        }
    }

    fn ocr_pages(&self, extractor: &PdfExtractor, ocr: &dyn ImageOcr, document: &Document) -> String {
        let mut page_count = extractor.page_count();
        if self.pdf.max_pages > 0 {
            page_count = page_count.min(u32::try_from(self.pdf.max_pages).unwrap_or(u32::MAX));
        }

        let mut chunks = Vec::new();
        for page in 1..=page_count {
            let images = match extractor.extract_images(page) {
                Ok(images) => images,
                Err(e) => {
                    warn!("Failed to decode images on page {} of {}: {}", page, document.name(), e);
                    continue;
                }
            };

            for image in &images {
                match ocr.recognize(image) {
                    Ok(text) if !text.trim().is_empty() => chunks.push(text),
                    Ok(_) => debug!("No text recognized on page {}", page),
                    Err(e) => warn!("OCR failed on page {} of {}: {}", page, document.name(), e),
                }
            }
        }

        chunks.join("\n")
    }
}

impl Default for PdfTextSource {
    fn default() -> Self {
        Self::new(PdfConfig::default())
    }
}

impl TextSource for PdfTextSource {
    fn extract_text(&self, document: &Document) -> String {
        match self.try_extract(document) {
            Ok(text) => text,
            Err(e) => {
                warn!("Error processing {}: {}", document.name(), e);
                String::new()
            }
        }
    }
}

fn meaningful_len(text: &str) -> usize {
    text.chars().filter(|c| !c.is_whitespace()).count()
}
