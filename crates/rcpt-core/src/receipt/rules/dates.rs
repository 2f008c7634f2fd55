//! Fuzzy date extraction.
//!
//! Each line is searched for something shaped like a date, ignoring whatever
//! text surrounds it. Numeric dates are read month-first, falling back to
//! day-first when the leading field cannot be a month.

use chrono::NaiveDate;
use tracing::trace;

use super::patterns::{DATE_DAY_MONTH_YEAR, DATE_MONTH_DAY_YEAR, DATE_NUMERIC, DATE_YMD, month_number};
use super::{ExtractionMatch, LineExtractor};

/// Date field extractor.
pub struct DateExtractor {
    year_pivot: u32,
}

impl DateExtractor {
    pub fn new() -> Self {
        Self { year_pivot: 50 }
    }

    /// Two-digit years up to `pivot` map to 20xx, later ones to 19xx.
    pub fn with_year_pivot(mut self, pivot: u32) -> Self {
        self.year_pivot = pivot.min(99);
        self
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineExtractor for DateExtractor {
    type Output = NaiveDate;

    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<NaiveDate>> {
        self.extract_all(lines).into_iter().next()
    }

    fn extract_all(&self, lines: &[&str]) -> Vec<ExtractionMatch<NaiveDate>> {
        lines
            .iter()
            .enumerate()
            .filter_map(|(i, line)| {
                let found = self.parse_line(line)?;
                Some(ExtractionMatch::new(found.date, found.confidence, *line).with_line(i))
            })
            .collect()
    }
}

/// A date located inside a line.
#[derive(Debug, Clone, Copy)]
struct DateSpan {
    date: NaiveDate,
    start: usize,
    end: usize,
    confidence: f32,
}

impl DateExtractor {
    /// Leftmost valid date in a line; on equal start the longer match wins.
    fn parse_line(&self, line: &str) -> Option<DateSpan> {
        let mut spans = Vec::new();

        for caps in DATE_MONTH_DAY_YEAR.captures_iter(line) {
            let month = month_number(&caps[1]);
            let day = caps[2].parse().ok();
            let year = self.expand_year(&caps[3]);
            push_span(&mut spans, &caps, year, month, day, 0.9);
        }

        for caps in DATE_DAY_MONTH_YEAR.captures_iter(line) {
            let day = caps[1].parse().ok();
            let month = month_number(&caps[2]);
            let year = self.expand_year(&caps[3]);
            push_span(&mut spans, &caps, year, month, day, 0.9);
        }

        for caps in DATE_YMD.captures_iter(line) {
            let year = caps[1].parse().ok();
            let month = caps[2].parse().ok();
            let day = caps[3].parse().ok();
            push_span(&mut spans, &caps, year, month, day, 0.85);
        }

        for caps in DATE_NUMERIC.captures_iter(line) {
            if caps[2] != caps[4] {
                continue;
            }
            let (Ok(first), Ok(second)) = (caps[1].parse::<u32>(), caps[3].parse::<u32>()) else {
                continue;
            };
            let year = self.expand_year(&caps[5]);

            // Month-first, then day-first when that is impossible
            let before = spans.len();
            push_span(&mut spans, &caps, year, Some(first), Some(second), 0.7);
            if spans.len() == before {
                push_span(&mut spans, &caps, year, Some(second), Some(first), 0.6);
            }
        }

        let best = spans
            .into_iter()
            .min_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)))?;
        trace!("Date {} found at {}..{} in {:?}", best.date, best.start, best.end, line);
        Some(best)
    }

    fn expand_year(&self, s: &str) -> Option<i32> {
        let digits = s.trim_start_matches('\'');
        let year: u32 = digits.parse().ok()?;
        if digits.len() > 2 {
            return i32::try_from(year).ok();
        }

        let century = if year <= self.year_pivot { 2000 } else { 1900 };
        i32::try_from(century + year).ok()
    }
}

fn push_span(
    spans: &mut Vec<DateSpan>,
    caps: &regex::Captures<'_>,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    confidence: f32,
) {
    let (Some(year), Some(month), Some(day)) = (year, month, day) else {
        return;
    };
    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        return;
    };
    // The whole match may include the character after the year
    let (Some(whole), Some(last_group)) = (caps.get(0), caps.get(caps.len() - 1)) else {
        return;
    };

    spans.push(DateSpan {
        date,
        start: whole.start(),
        end: last_group.end(),
        confidence,
    });
}

/// Parse the first date found anywhere in `text`, as `YYYY-MM-DD`.
pub fn parse_fuzzy_date(text: &str) -> Option<String> {
    DateExtractor::new()
        .parse_line(text)
        .map(|span| span.date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn first_date(lines: &[&str]) -> Option<NaiveDate> {
        DateExtractor::new().extract(lines).map(|m| m.value)
    }

    #[test]
    fn test_month_name_in_sentence() {
        assert_eq!(
            parse_fuzzy_date("Thank you for shopping on March 3, 2023"),
            Some("2023-03-03".to_string())
        );
    }

    #[test]
    fn test_month_name_variants() {
        assert_eq!(first_date(&["Mar. 3rd 2023"]), Some(ymd(2023, 3, 3)));
        assert_eq!(first_date(&["Date: 3 March 2023"]), Some(ymd(2023, 3, 3)));
        assert_eq!(first_date(&["03-Mar-23 14:02"]), Some(ymd(2023, 3, 3)));
        assert_eq!(first_date(&["the 21st of September, 2022"]), Some(ymd(2022, 9, 21)));
        assert_eq!(first_date(&["Dec 31 '99"]), Some(ymd(1999, 12, 31)));
    }

    #[test]
    fn test_iso_date() {
        assert_eq!(first_date(&["Printed 2024-01-15 09:12"]), Some(ymd(2024, 1, 15)));
        assert_eq!(first_date(&["2024/1/5"]), Some(ymd(2024, 1, 5)));
    }

    #[test]
    fn test_iso_timestamp() {
        assert_eq!(parse_fuzzy_date("2023-03-03T10:00:00"), Some("2023-03-03".to_string()));
        assert_eq!(parse_fuzzy_date("Date:2023-03-03T10:00"), Some("2023-03-03".to_string()));
        assert_eq!(parse_fuzzy_date("2023-03-03 10:00"), Some("2023-03-03".to_string()));
    }

    #[test]
    fn test_letters_after_numeric_date() {
        assert_eq!(first_date(&["Paid 03/14/23pm"]), Some(ymd(2023, 3, 14)));
        assert_eq!(first_date(&["Ref 2023-03-031"]), None);
    }

    #[test]
    fn test_numeric_month_first() {
        assert_eq!(first_date(&["03/04/2023"]), Some(ymd(2023, 3, 4)));
        assert_eq!(first_date(&["3-14-23"]), Some(ymd(2023, 3, 14)));
    }

    #[test]
    fn test_numeric_day_first_fallback() {
        assert_eq!(first_date(&["14.03.2023"]), Some(ymd(2023, 3, 14)));
    }

    #[test]
    fn test_mixed_separators_rejected() {
        assert_eq!(first_date(&["03/04-2023"]), None);
    }

    #[test]
    fn test_impossible_date_skipped() {
        assert_eq!(first_date(&["02/30/2023", "Feb 28, 2023"]), Some(ymd(2023, 2, 28)));
    }

    #[test]
    fn test_first_parsable_line_wins() {
        let lines = ["Acme Hardware", "Total $12.50", "01/02/2023", "2023-12-31"];
        let found = DateExtractor::new().extract(&lines).unwrap();

        assert_eq!(found.value, ymd(2023, 1, 2));
        assert_eq!(found.line, Some(2));
    }

    #[test]
    fn test_leftmost_in_line() {
        assert_eq!(
            first_date(&["Jan 5, 2023 returned by 2023-02-05"]),
            Some(ymd(2023, 1, 5))
        );
    }

    #[test]
    fn test_no_date() {
        assert_eq!(first_date(&["Acme", "Total: $1,234.56", "Order #4523"]), None);
        assert_eq!(parse_fuzzy_date(""), None);
    }

    #[test]
    fn test_year_pivot() {
        let extractor = DateExtractor::new().with_year_pivot(20);
        assert_eq!(
            extractor.extract(&["1/2/30"]).map(|m| m.value),
            Some(ymd(1930, 1, 2))
        );
        assert_eq!(first_date(&["1/2/30"]), Some(ymd(2030, 1, 2)));
    }
}
