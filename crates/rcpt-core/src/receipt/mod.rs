//! Receipt field extraction module.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, FieldMatches, HeuristicReceiptParser};

use crate::models::receipt::ReceiptRecord;

/// Trait for receipt parsing.
///
/// Parsing never fails: fields that no rule finds are left empty.
pub trait ReceiptParser {
    /// Parse receipt text, keeping per-field match details.
    fn parse(&self, text: &str) -> ExtractionResult;

    /// Parse receipt text into a bare record.
    fn extract(&self, text: &str) -> ReceiptRecord {
        self.parse(text).record
    }
}

/// Parse receipt text with the default heuristics.
pub fn parse_receipt(text: &str) -> ReceiptRecord {
    HeuristicReceiptParser::new().extract(text)
}
