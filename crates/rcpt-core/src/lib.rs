//! Core library for receipt field extraction.
//!
//! This crate provides:
//! - PDF text extraction with an image OCR fallback seam
//! - Heuristic receipt field extraction (date, vendor, total)
//! - Batch processing over folders or uploaded documents

pub mod batch;
pub mod error;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod receipt;
pub mod source;

pub use batch::{DocumentOutcome, ReceiptPipeline};
pub use error::{RcptError, Result};
pub use models::config::RcptConfig;
pub use models::receipt::{ReceiptBatch, ReceiptRecord, NO_DATA_MESSAGE};
pub use ocr::{ImageOcr, TextBox};
#[cfg(feature = "ocr")]
pub use ocr::PureOcrEngine;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use receipt::{ExtractionResult, HeuristicReceiptParser, ReceiptParser, parse_receipt};
pub use source::{Document, PdfTextSource, TextSource};
