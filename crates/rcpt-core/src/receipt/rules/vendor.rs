//! Vendor name detection.

use super::patterns::DIGIT;
use super::{ExtractionMatch, LineExtractor};

/// Picks the first line without any digit as the vendor name.
///
/// Vendor names rarely carry digits and usually sit above dates and amounts.
/// A digit-free line of punctuation or OCR noise is still accepted.
pub struct VendorExtractor;

impl VendorExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VendorExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl LineExtractor for VendorExtractor {
    type Output = String;

    fn extract(&self, lines: &[&str]) -> Option<ExtractionMatch<String>> {
        self.extract_all(lines).into_iter().next()
    }

    fn extract_all(&self, lines: &[&str]) -> Vec<ExtractionMatch<String>> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !has_digit(line))
            .map(|(i, line)| {
                let name = line.trim();
                ExtractionMatch::new(name.to_string(), 0.5, name).with_line(i)
            })
            .collect()
    }
}

/// Decimal digits in any script; fractions and numeral letters such as `½`
/// or `Ⅻ` do not count.
fn has_digit(line: &str) -> bool {
    DIGIT.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skips_lines_with_digits() {
        let lines = ["Order #4523", "Acme Hardware", "123 Main St"];
        let vendor = VendorExtractor::new().extract(&lines).unwrap();

        assert_eq!(vendor.value, "Acme Hardware");
        assert_eq!(vendor.line, Some(1));
    }

    #[test]
    fn test_all_lines_numeric() {
        let lines = ["03/14/2023", "Total 12.00", "Visa 4421"];
        assert!(VendorExtractor::new().extract(&lines).is_none());
    }

    #[test]
    fn test_punctuation_line_is_accepted() {
        let lines = ["***", "Acme Hardware"];
        assert_eq!(VendorExtractor::new().extract(&lines).unwrap().value, "***");
    }

    #[test]
    fn test_non_ascii_digits_count() {
        let lines = ["Store ٣", "Café Lumière"];
        assert_eq!(
            VendorExtractor::new().extract(&lines).unwrap().value,
            "Café Lumière"
        );
    }

    #[test]
    fn test_fractions_and_numerals_are_not_digits() {
        let lines = ["½ Price Books", "Acme"];
        assert_eq!(
            VendorExtractor::new().extract(&lines).unwrap().value,
            "½ Price Books"
        );

        let lines = ["Ⅻ Club", "Acme"];
        assert_eq!(VendorExtractor::new().extract(&lines).unwrap().value, "Ⅻ Club");
    }

    #[test]
    fn test_extract_all_in_order() {
        let lines = ["Acme", "1 Elm St", "Thank you"];
        let names: Vec<_> = VendorExtractor::new()
            .extract_all(&lines)
            .into_iter()
            .map(|m| m.value)
            .collect();
        assert_eq!(names, vec!["Acme", "Thank you"]);
    }
}
