//! Heuristic receipt parser combining the line rules.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::ReceiptRecord;

use super::ReceiptParser;
use super::rules::{
    AmountExtractor, DateExtractor, ExtractionMatch, LineExtractor, VendorExtractor,
    normalize_lines,
};

/// Result of receipt extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// Extracted receipt fields.
    pub record: ReceiptRecord,
    /// Where each field came from.
    pub matches: FieldMatches,
    /// Number of non-empty lines examined.
    pub line_count: usize,
    /// Notes about fields that could not be found.
    pub warnings: Vec<String>,
}

/// Per-field match details.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMatches {
    pub date: Option<ExtractionMatch<NaiveDate>>,
    pub vendor: Option<ExtractionMatch<String>>,
    pub total: Option<ExtractionMatch<Decimal>>,
}

impl FieldMatches {
    /// Mean confidence over the fields that were found, 0.0 when none were.
    pub fn confidence(&self) -> f32 {
        let scores: Vec<f32> = [
            self.date.as_ref().map(|m| m.confidence),
            self.vendor.as_ref().map(|m| m.confidence),
            self.total.as_ref().map(|m| m.confidence),
        ]
        .into_iter()
        .flatten()
        .collect();

        if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f32>() / scores.len() as f32
        }
    }
}

/// Receipt parser built from the vendor, amount and date rules.
pub struct HeuristicReceiptParser {
    vendor: VendorExtractor,
    amount: AmountExtractor,
    date: DateExtractor,
}

impl HeuristicReceiptParser {
    /// Create a parser with the default keyword list.
    pub fn new() -> Self {
        Self {
            vendor: VendorExtractor::new(),
            amount: AmountExtractor::new(),
            date: DateExtractor::new(),
        }
    }

    /// Create a parser from extraction settings.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self {
            vendor: VendorExtractor::new(),
            amount: AmountExtractor::with_keywords(&config.total_keywords)
                .with_scan_past_unpriced(config.scan_past_unpriced_keyword),
            date: DateExtractor::new().with_year_pivot(config.two_digit_year_pivot),
        }
    }

    /// Replace the total keyword list.
    pub fn with_total_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.amount = AmountExtractor::with_keywords(keywords);
        self
    }
}

impl Default for HeuristicReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptParser for HeuristicReceiptParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let lines = normalize_lines(text);
        let mut warnings = Vec::new();

        let matches = FieldMatches {
            date: self.date.extract(&lines),
            vendor: self.vendor.extract(&lines),
            total: self.amount.extract(&lines),
        };

        if matches.date.is_none() {
            warnings.push("Could not extract date".to_string());
        }
        if matches.vendor.is_none() {
            warnings.push("Could not extract vendor".to_string());
        }
        if matches.total.is_none() {
            warnings.push("Could not extract total".to_string());
        }

        let record = ReceiptRecord::new(
            matches.date.as_ref().map(|m| m.value),
            matches.vendor.as_ref().map(|m| m.value.clone()),
            matches.total.as_ref().map(|m| m.value),
        );

        debug!(
            lines = lines.len(),
            date = ?record.date,
            vendor = ?record.vendor,
            total = ?record.total,
            "Parsed receipt"
        );

        ExtractionResult {
            record,
            matches,
            line_count: lines.len(),
            warnings,
        }
    }
}
