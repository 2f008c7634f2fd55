//! Total amount extraction.
//!
//! The total is read from the first line mentioning a total keyword. Only
//! amounts with exactly two decimals are recognized, so `$5` or `$5.5` never
//! count as a total. A rightmost token too large for `Decimal` (above about
//! 7.9e28) leaves the line without an amount.

use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::debug;

use super::patterns::AMOUNT_TOKEN;
use super::{ExtractionMatch, LineExtractor};
use crate::models::config::DEFAULT_TOTAL_KEYWORDS;

/// Keyword-anchored total extractor.
pub struct AmountExtractor {
    /// Lowercased keywords.
    keywords: Vec<String>,
    /// Continue past keyword lines that carry no amount.
    scan_past_unpriced: bool,
}

impl AmountExtractor {
    pub fn new() -> Self {
        Self::with_keywords(DEFAULT_TOTAL_KEYWORDS.iter().copied())
    }

    /// Use a custom keyword list.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            scan_past_unpriced: false,
        }
    }

    /// Keep searching later keyword lines when one yields no amount.
    pub fn with_scan_past_unpriced(mut self, scan: bool) -> Self {
        self.scan_past_unpriced = scan;
        self
    }

    fn is_keyword_line(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Amount for the keyword line at `index`: its own rightmost token, or
    /// the rightmost token of the next line.
    fn amount_for_keyword_line(
        &self,
        lines: &[&str],
        index: usize,
    ) -> Option<ExtractionMatch<Decimal>> {
        if let Some(amount) = last_amount(lines[index]) {
            return Some(ExtractionMatch::new(amount, 0.9, lines[index]).with_line(index));
        }

        let next = index + 1;
        let amount = last_amount(lines.get(next)?)?;
        Some(ExtractionMatch::new(amount, 0.7, lines[next]).with_line(next))
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineExtractor for AmountExtractor {
    type Output = Decimal;

    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<Decimal>> {
        for (i, line) in lines.iter().enumerate() {
            if !self.is_keyword_line(line) {
                continue;
            }

            match self.amount_for_keyword_line(lines, i) {
                Some(found) => return Some(found),
                None if self.scan_past_unpriced => {
                    debug!("Keyword line {} has no amount, continuing", i);
                }
                None => {
                    debug!("Keyword line {} has no amount", i);
                    return None;
                }
            }
        }

        None
    }

    fn extract_all(&self, lines: &[&str]) -> Vec<ExtractionMatch<Decimal>> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| self.is_keyword_line(line))
            .filter_map(|(i, _)| self.amount_for_keyword_line(lines, i))
            .collect()
    }
}

/// Rightmost two-decimal amount on a line.
fn last_amount(line: &str) -> Option<Decimal> {
    let caps = AMOUNT_TOKEN.captures_iter(line).last()?;
    let amount = parse_amount_token(&caps[1]);
    if amount.is_none() {
        debug!("Amount token {:?} is out of range", &caps[1]);
    }
    amount
}

/// Parse an amount token such as `1,234.56`, dropping thousands separators.
pub fn parse_amount_token(token: &str) -> Option<Decimal> {
    let cleaned = token.trim_start_matches('$').replace(',', "");
    let normalized = if cleaned.starts_with('.') {
        format!("0{}", cleaned)
    } else {
        cleaned
    };

    Decimal::from_str(&normalized).ok()
}
