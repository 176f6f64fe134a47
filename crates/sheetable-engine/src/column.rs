//! Column Index Table.
//!
//! Bidirectional conversion between spreadsheet column letters and zero-based
//! physical offsets. `A`..`Z` resolve through a constant table; longer names
//! (`AA`, `AB`, ...) continue in bijective base-26.
//!
//! # Examples
//!
//! ```
//! use sheetable_engine::column::{column_index, column_letters};
//!
//! assert_eq!(column_index("B"), Some(1));
//! assert_eq!(column_index("AA"), Some(26));
//! assert_eq!(column_letters(25), "Z");
//! ```

/// Single-letter columns in offset order.
pub const COLUMN_LETTERS: [&str; 26] = [
    "A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M", "N", "O", "P", "Q", "R",
    "S", "T", "U", "V", "W", "X", "Y", "Z",
];

/// Offset of the last column in the default table range (`Z`).
pub const DEFAULT_LAST_COLUMN: usize = COLUMN_LETTERS.len() - 1;

/// Resolve a column name (case-insensitive) to its zero-based offset.
/// Returns None for empty, non-alphabetic, or overflowing names.
pub fn column_index(letters: &str) -> Option<usize> {
    if letters.is_empty() || !letters.bytes().all(|b| b.is_ascii_alphabetic()) {
        return None;
    }
    if letters.len() == 1 {
        let upper = letters.to_ascii_uppercase();
        return COLUMN_LETTERS.iter().position(|l| *l == upper);
    }

    let mut acc = 0usize;
    for c in letters.to_ascii_uppercase().bytes() {
        let digit = (c - b'A') as usize + 1;
        acc = acc.checked_mul(26)?.checked_add(digit)?;
    }
    acc.checked_sub(1)
}

/// Convert a zero-based offset to column letters (0 -> A, 25 -> Z, 26 -> AA).
pub fn column_letters(index: usize) -> String {
    if let Some(letter) = COLUMN_LETTERS.get(index) {
        return (*letter).to_string();
    }
    let mut result = String::new();
    let mut n = index as u128 + 1;
    while n > 0 {
        n -= 1;
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    result
}

/// Normalize a column name to upper case, validating it on the way.
pub fn normalize(letters: &str) -> Option<String> {
    column_index(letters).map(column_letters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_letters_follow_table() {
        for (i, letter) in COLUMN_LETTERS.iter().enumerate() {
            assert_eq!(column_index(letter), Some(i));
            assert_eq!(column_letters(i), *letter);
        }
    }

    #[test]
    fn test_multi_letter_columns() {
        assert_eq!(column_index("AA"), Some(26));
        assert_eq!(column_index("AZ"), Some(51));
        assert_eq!(column_index("BA"), Some(52));
        assert_eq!(column_letters(27), "AB");
        assert_eq!(column_letters(52), "BA");
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(column_index("c"), Some(2));
        assert_eq!(normalize("ab").as_deref(), Some("AB"));
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(column_index(""), None);
        assert_eq!(column_index("A1"), None);
        assert_eq!(column_index("Ä"), None);
        assert_eq!(column_index(&"Z".repeat(40)), None);
    }

    #[test]
    fn test_column_letters_handles_max_usize() {
        let letters = column_letters(usize::MAX);
        assert!(!letters.is_empty());
        assert!(letters.chars().all(|c| c.is_ascii_uppercase()));
    }
}
