//! Line-based field rules for receipts.

pub mod amounts;
pub mod dates;
pub mod lines;
pub mod patterns;
pub mod vendor;

pub use amounts::{AmountExtractor, parse_amount_token};
pub use dates::{DateExtractor, parse_fuzzy_date};
pub use lines::normalize_lines;
pub use vendor::VendorExtractor;

/// Trait for field extractors working over normalized lines.
pub trait LineExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field, applying the rule's tie-breaking.
    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<Self::Output>>;

    /// All candidates in document order.
    fn extract_all(&self, lines: &[&str]) -> Vec<ExtractionMatch<Self::Output>>;
}

/// An extracted value with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Confidence score (0.0 - 1.0).
    pub confidence: f32,
    /// Index of the line the value was read from.
    pub line: Option<usize>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, confidence: f32, source: impl Into<String>) -> Self {
        Self {
            value,
            confidence,
            line: None,
            source: source.into(),
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }
}
