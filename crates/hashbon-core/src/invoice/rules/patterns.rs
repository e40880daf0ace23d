//! Common regex patterns for milestone invoice extraction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::vocabulary::VAT_PATTERNS;

lazy_static! {
    // "לתשלום 11,700 ₪": payable label, amount, shekel sign
    pub static ref VAT_PAYABLE_AMOUNT_SIGN: Regex = Regex::new(VAT_PATTERNS[0]).unwrap();

    // "₪ 11,700 לתשלום": mirrored line order
    pub static ref VAT_SIGN_AMOUNT_PAYABLE: Regex = Regex::new(VAT_PATTERNS[1]).unwrap();

    // "סה"כ (כולל מע"מ) לתשלום ... 11,700": loose total line
    pub static ref VAT_TOTAL_LINE: Regex = Regex::new(VAT_PATTERNS[2]).unwrap();

    /// Built-in VAT patterns in match order.
    pub static ref DEFAULT_VAT_PATTERNS: Vec<Regex> = vec![
        VAT_PAYABLE_AMOUNT_SIGN.clone(),
        VAT_SIGN_AMOUNT_PAYABLE.clone(),
        VAT_TOTAL_LINE.clone(),
    ];
}
