//! Common regex patterns for receipt extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// End of a date: anything but another digit. Consumes one character, so
/// callers take the span end from the last capture group.
const YEAR_END: &str = r"(?:[^0-9]|$)";

/// English month names and their usual abbreviations.
const MONTH: &str = r"(jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sept?(?:ember)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)";

lazy_static! {
    // Currency token: optional dollar sign, digits with commas, exactly two decimals
    pub static ref AMOUNT_TOKEN: Regex = Regex::new(
        r"\$?([0-9,]+\.[0-9]{2})"
    ).unwrap();

    // "March 3, 2023", "Mar. 3rd 2023", "Mar-03-23"
    pub static ref DATE_MONTH_DAY_YEAR: Regex = Regex::new(&format!(
        r"(?i)\b{MONTH}\.?[\s\-/]*(\d{{1,2}})(?:st|nd|rd|th)?\b,?[\s\-/,]+'?(\d{{4}}|\d{{2}}){YEAR_END}"
    )).unwrap();

    // "3 March 2023", "03-Mar-23", "3rd of March, 2023"
    pub static ref DATE_DAY_MONTH_YEAR: Regex = Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?[\s\-/.]*(?:of\s+)?{MONTH}\.?,?[\s\-/.,]*'?(\d{{4}}|\d{{2}}){YEAR_END}"
    )).unwrap();

    // "2023-03-03", "2023/3/3", "2023.03.03", "2023-03-03T10:00:00"
    pub static ref DATE_YMD: Regex = Regex::new(&format!(
        r"\b(\d{{4}})[-/.](\d{{1,2}})[-/.](\d{{1,2}}){YEAR_END}"
    )).unwrap();

    // "3/14/2023", "03-14-23", "14.03.2023"
    pub static ref DATE_NUMERIC: Regex = Regex::new(&format!(
        r"\b(\d{{1,2}})([-/.])(\d{{1,2}})([-/.])(\d{{4}}|\d{{2}}){YEAR_END}"
    )).unwrap();

    // Any Unicode decimal digit (category Nd)
    pub static ref DIGIT: Regex = Regex::new(r"\d").unwrap();
}

/// Month number for an English month name or abbreviation.
pub fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
