//! Splitting raw receipt text into reading-order lines.

/// Characters treated as line breaks.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\u{000b}', '\u{000c}', '\u{001c}', '\u{001d}', '\u{001e}', '\u{0085}',
    '\u{2028}', '\u{2029}',
];

/// Split text into trimmed, non-empty lines in their original order.
pub fn normalize_lines(text: &str) -> Vec<&str> {
    text.split(LINE_BREAKS)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trims_and_drops_blank_lines() {
        let text = "  Acme Hardware  \n\n   \n123 Main St\r\nTotal: $4.00\n";
        assert_eq!(
            normalize_lines(text),
            vec!["Acme Hardware", "123 Main St", "Total: $4.00"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(normalize_lines("").is_empty());
        assert!(normalize_lines(" \n\t\n ").is_empty());
    }

    #[test]
    fn test_page_breaks_split_lines() {
        let text = "Page one end\u{000c}Page two start";
        assert_eq!(normalize_lines(text), vec!["Page one end", "Page two start"]);
    }
}
