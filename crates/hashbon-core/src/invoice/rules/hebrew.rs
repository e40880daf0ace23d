//! Repair of Hebrew text emitted in visual (mirrored) order.
//!
//! Some PDF text layers store right-to-left runs left-to-right, so extracted
//! Hebrew reads backwards. The repair is coarse: when any known
//! mirrored fragment appears, the whole string is flipped. Strings that mix a
//! mirrored Hebrew run with digits or Latin text get those segments flipped
//! too (`"12 בלש"` becomes `"שלב 21"`). Everything that depends on the
//! heuristic goes through [`normalize_with`] so it can be replaced in one place.

use crate::models::vocabulary::REVERSED_FRAGMENTS;

/// Replace line breaks with spaces, collapse whitespace runs and trim.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Reverse a string by characters.
pub fn reverse_chars(text: &str) -> String {
    text.chars().rev().collect()
}

/// Whether the text contains any of the mirrored fragments.
pub fn looks_reversed<S: AsRef<str>>(text: &str, fragments: &[S]) -> bool {
    fragments.iter().any(|f| text.contains(f.as_ref()))
}

/// Normalize with the built-in fragment list.
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, &REVERSED_FRAGMENTS)
}

/// Collapse whitespace, then flip the whole string if it looks mirrored.
pub fn normalize_with<S: AsRef<str>>(raw: &str, fragments: &[S]) -> String {
    let text = collapse_whitespace(raw);
    if looks_reversed(&text, fragments) {
        reverse_chars(&text)
    } else {
        text
    }
}
