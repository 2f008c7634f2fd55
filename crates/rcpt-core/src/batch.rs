//! Receipt pipeline: document text in, records out.

use tracing::{debug, info};

use crate::models::config::RcptConfig;
use crate::models::receipt::{ReceiptBatch, ReceiptRecord};
use crate::receipt::{ExtractionResult, HeuristicReceiptParser, ReceiptParser};
use crate::source::{Document, PdfTextSource, TextSource};

/// What happened to one document.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentOutcome {
    /// Text was found and fields were extracted.
    Extracted(Box<ExtractionResult>),
    /// No text could be read; the document contributes no record.
    Skipped,
}

/// Runs documents through a text source and a receipt parser.
pub struct ReceiptPipeline<S, P = HeuristicReceiptParser> {
    source: S,
    parser: P,
}

impl<S: TextSource> ReceiptPipeline<S> {
    /// Pipeline using the default heuristics.
    pub fn new(source: S) -> Self {
        Self {
            source,
            parser: HeuristicReceiptParser::new(),
        }
    }
}

impl ReceiptPipeline<PdfTextSource> {
    /// PDF pipeline built from configuration.
    pub fn from_config(config: &RcptConfig) -> Self {
        Self {
            source: PdfTextSource::from_config(&config.pdf, &config.ocr),
            parser: HeuristicReceiptParser::from_config(&config.extraction),
        }
    }
}

impl<S: TextSource, P: ReceiptParser> ReceiptPipeline<S, P> {
    /// Replace the parser.
    pub fn with_parser<Q: ReceiptParser>(self, parser: Q) -> ReceiptPipeline<S, Q> {
        ReceiptPipeline {
            source: self.source,
            parser,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    /// Extract a record from one document.
    ///
    /// Documents without text produce an all-empty record.
    pub fn extract_receipt(&self, document: &Document) -> ReceiptRecord {
        let text = self.source.extract_text(document);
        self.parser.extract(&text)
    }

    /// Extract one document, reporting documents without text as skipped.
    pub fn process_document(&self, document: &Document) -> DocumentOutcome {
        let text = self.source.extract_text(document);
        if text.trim().is_empty() {
            debug!("No text in {}, skipping", document.name());
            return DocumentOutcome::Skipped;
        }

        DocumentOutcome::Extracted(Box::new(self.parser.parse(&text)))
    }

    /// Process documents in order, one record per document that had text.
    pub fn extract_batch<'a, I>(&self, documents: I) -> ReceiptBatch
    where
        I: IntoIterator<Item = &'a Document>,
    {
        self.extract_batch_with(documents, |_, _| {})
    }

    /// Like [`extract_batch`](Self::extract_batch), calling `on_outcome` for
    /// each document before its record joins the batch.
    pub fn extract_batch_with<'a, I, F>(&self, documents: I, mut on_outcome: F) -> ReceiptBatch
    where
        I: IntoIterator<Item = &'a Document>,
        F: FnMut(&Document, &DocumentOutcome),
    {
        let mut batch = ReceiptBatch::new();

        for document in documents {
            let outcome = self.process_document(document);
            on_outcome(document, &outcome);
            match outcome {
                DocumentOutcome::Extracted(result) => batch.push(result.record),
                DocumentOutcome::Skipped => batch.skip(),
            }
        }

        info!(
            "Extracted {} receipts ({} skipped)",
            batch.len(),
            batch.skipped
        );
        batch
    }
}
