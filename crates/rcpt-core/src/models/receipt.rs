//! Receipt data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Message reported when a batch produced no records.
pub const NO_DATA_MESSAGE: &str = "No data extracted from receipts.";

/// Column headers for tabular output, in display order.
pub const COLUMNS: [&str; 3] = ["Date", "Vendor", "Total"];

/// The three fields recovered from one receipt.
///
/// Every field is independently optional. A missing field means no heuristic
/// matched, which is a valid final state rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptRecord {
    /// Transaction date.
    pub date: Option<NaiveDate>,

    /// Vendor name as it appears on the receipt.
    pub vendor: Option<String>,

    /// Total amount paid.
    pub total: Option<Decimal>,
}

impl ReceiptRecord {
    pub fn new(date: Option<NaiveDate>, vendor: Option<String>, total: Option<Decimal>) -> Self {
        Self { date, vendor, total }
    }

    /// Date formatted as `YYYY-MM-DD`.
    pub fn date_iso(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m-%d").to_string())
    }

    /// True when no field was found.
    pub fn is_blank(&self) -> bool {
        self.date.is_none() && self.vendor.is_none() && self.total.is_none()
    }

    /// Row cells in [`COLUMNS`] order; absent fields become empty strings.
    pub fn to_row(&self) -> [String; 3] {
        [
            self.date_iso().unwrap_or_default(),
            self.vendor.clone().unwrap_or_default(),
            self.total.map(|t| t.to_string()).unwrap_or_default(),
        ]
    }
}

/// Records extracted from a batch of documents, in input order.
///
/// Documents that yielded no usable text have no record here; they are only
/// counted in `skipped`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptBatch {
    /// One record per document with usable text.
    pub records: Vec<ReceiptRecord>,

    /// Number of documents dropped for lack of text.
    #[serde(default)]
    pub skipped: usize,
}

impl ReceiptBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ReceiptRecord) {
        self.records.push(record);
    }

    pub fn skip(&mut self) {
        self.skipped += 1;
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ReceiptRecord> {
        self.records.iter()
    }

    /// The informational message for an empty batch, if this batch is empty.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.is_empty().then_some(NO_DATA_MESSAGE)
    }
}

impl<'a> IntoIterator for &'a ReceiptBatch {
    type Item = &'a ReceiptRecord;
    type IntoIter = std::slice::Iter<'a, ReceiptRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
