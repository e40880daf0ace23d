//! Numeric parsing for table cells and pattern captures.

/// Raw cell values that are stored as the number zero rather than as text.
pub const ZERO_LITERALS: [&str; 3] = ["0", "0.0", "0.00"];

/// Parse an amount such as `"1,234.50"`, `"₪ 300"` or `"17%"`.
///
/// Thousands separators, the shekel sign and the percent sign are dropped
/// before parsing. Missing, empty and unparsable input all give `0.0`.
pub fn parse_number(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };

    let cleaned = raw.replace([',', '₪', '%'], "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0.0;
    }

    cleaned.parse::<f64>().unwrap_or(0.0)
}

/// Shorthand for [`parse_number`] on a present value.
pub fn parse_amount(raw: &str) -> f64 {
    parse_number(Some(raw))
}

/// Whether the trimmed raw value is literally one of [`ZERO_LITERALS`].
pub fn is_zero_literal(raw: &str) -> bool {
    ZERO_LITERALS.contains(&raw.trim())
}
