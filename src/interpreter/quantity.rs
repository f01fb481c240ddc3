//! Quantity token normalization
//!
//! Spoken quantities arrive either as digits ("2") or as English number
//! words ("two"). Only one through ten are recognized as words.

const NUMBER_WORDS: [&str; 10] = [
    "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
];

/// Map a single token to a quantity.
///
/// Returns `None` for anything that is neither an ASCII digit string that
/// fits in a `u32` nor one of the words `one`..`ten`.
pub fn normalize_quantity(token: &str) -> Option<u32> {
    if !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit()) {
        return token.parse().ok();
    }

    NUMBER_WORDS
        .iter()
        .position(|word| word.eq_ignore_ascii_case(token))
        .map(|index| index as u32 + 1)
}

/// Alternation of the recognized number words, for use inside a regex
pub(crate) fn number_word_alternation() -> String {
    NUMBER_WORDS.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_words() {
        assert_eq!(normalize_quantity("one"), Some(1));
        assert_eq!(normalize_quantity("Three"), Some(3));
        assert_eq!(normalize_quantity("TEN"), Some(10));
    }

    #[test]
    fn test_digits() {
        assert_eq!(normalize_quantity("7"), Some(7));
        assert_eq!(normalize_quantity("012"), Some(12));
        assert_eq!(normalize_quantity("0"), Some(0));
    }

    #[test]
    fn test_rejects_everything_else() {
        assert_eq!(normalize_quantity(""), None);
        assert_eq!(normalize_quantity("eleven"), None);
        assert_eq!(normalize_quantity("2x"), None);
        assert_eq!(normalize_quantity("-3"), None);
        assert_eq!(normalize_quantity("99999999999"), None);
        // Devanagari digits are not ASCII digits
        assert_eq!(normalize_quantity("२"), None);
    }
}
