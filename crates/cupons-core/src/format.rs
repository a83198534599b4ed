//! # Display Formatting
//!
//! Masks for phone numbers and postal codes (CEP), percentage rendering and
//! the `dd/mm/yyyy` date format used on screen. CPF/CNPJ masks live in
//! [`crate::document`] but share [`apply_mask`].
//!
//! Every function here is total: malformed input is returned as its bare
//! digits instead of failing.

use chrono::NaiveDate;

use crate::document::strip_non_digits;

const PHONE_10_MASK: &str = "(##) ####-####";
const PHONE_11_MASK: &str = "(##) #####-####";
const POSTAL_CODE_MASK: &str = "#####-###";

/// Fills each `#` in `mask` with the next digit.
///
/// Returns `digits` unchanged when there are fewer digits than slots; extra
/// digits are appended after the mask.
pub(crate) fn apply_mask(digits: &str, mask: &str) -> String {
    let slots = mask.chars().filter(|&c| c == '#').count();
    if digits.chars().count() < slots {
        return digits.to_string();
    }

    let mut source = digits.chars();
    let mut out = String::with_capacity(mask.len() + digits.len() - slots);
    for c in mask.chars() {
        match c {
            '#' => {
                if let Some(d) = source.next() {
                    out.push(d);
                }
            }
            other => out.push(other),
        }
    }
    out.extend(source);
    out
}

/// Formats a landline (10 digits) or mobile (11 digits) number.
///
/// ## Example
/// ```rust
/// use cupons_core::format::format_phone;
///
/// assert_eq!(format_phone("1133334444"), "(11) 3333-4444");
/// assert_eq!(format_phone("11987654321"), "(11) 98765-4321");
/// assert_eq!(format_phone("12345"), "12345");
/// ```
pub fn format_phone(input: &str) -> String {
    let digits = strip_non_digits(input);
    match digits.len() {
        10 => apply_mask(&digits, PHONE_10_MASK),
        11 => apply_mask(&digits, PHONE_11_MASK),
        _ => digits,
    }
}

/// Formats a CEP as `#####-###`.
pub fn format_postal_code(input: &str) -> String {
    apply_mask(&strip_non_digits(input), POSTAL_CODE_MASK)
}

/// Renders a stored fraction (0.15) as a whole percentage ("15%").
///
/// Rounds half away from zero.
pub fn format_percentage(fraction: f64) -> String {
    let percent = (fraction * 100.0).round();
    // -0.004 rounds to -0
    let percent = if percent == 0.0 { 0.0 } else { percent };
    format!("{percent:.0}%")
}

/// Formats a date as `dd/mm/yyyy`.
pub fn format_date_br(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
