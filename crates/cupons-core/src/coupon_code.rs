//! # Coupon Codes
//!
//! Every coupon is identified by a random 12-character code drawn from
//! `A-Z0-9`. The generator does not check uniqueness; the coupon table's
//! primary key does, and the creating workflow retries on collision.
//!
//! 36^12 ≈ 4.7 × 10^18 codes, so a retry is rare.

use rand::Rng;

/// Length of a coupon code.
pub const COUPON_CODE_LEN: usize = 12;

/// Characters a coupon code may contain.
pub const COUPON_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a fresh coupon code.
///
/// ## Example
/// ```rust
/// use cupons_core::coupon_code::{generate_coupon_code, is_coupon_code};
///
/// let code = generate_coupon_code();
/// assert!(is_coupon_code(&code));
/// ```
pub fn generate_coupon_code() -> String {
    let mut rng = rand::rng();
    (0..COUPON_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..COUPON_CODE_ALPHABET.len());
            COUPON_CODE_ALPHABET[idx] as char
        })
        .collect()
}

/// Checks that a string has the shape of a coupon code.
pub fn is_coupon_code(code: &str) -> bool {
    code.len() == COUPON_CODE_LEN && code.bytes().all(|b| COUPON_CODE_ALPHABET.contains(&b))
}
