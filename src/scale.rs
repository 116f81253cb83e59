//! Fixed-point price scaling.
//!
//! Human prices are stored internally as scaled integers: `scale = 10^decimal_places`
//! and a price string `p` is parsed and scaled as an exact decimal, rounding
//! half-away-from-zero. All book-internal comparisons and map keys use this
//! integer form; floating point is only ever used for presentation.

use crate::errors::BookError;

/// Computes `10^decimal_places` as the scaling factor applied to incoming prices.
pub fn scale_factor(decimal_places: u32) -> u64 {
    10u64.pow(decimal_places)
}

/// Scales a decimal price string into the integer representation, rounding
/// half-away-from-zero on the first dropped fractional digit.
///
/// Parses digit-by-digit instead of going through `f64`: a price string like
/// `"1.005"` has no exact binary float representation, so `str::parse::<f64>`
/// followed by `* scale` and `.round()` can land on the wrong side of the
/// rounding boundary (`1.005_f64` is actually `1.00499999999999989...`). Exact
/// decimal-string arithmetic avoids that bias entirely.
pub fn scale_price(price: &str, decimal_places: u32) -> Result<u64, BookError> {
    let price = price.trim();
    let (int_part, frac_part) = price.split_once('.').unwrap_or((price, ""));
    let int_part = if int_part.is_empty() { "0" } else { int_part };
    let malformed = || BookError::io(format!("bad price field: {price}"));

    let whole: u64 = int_part.parse().map_err(|_| malformed())?;
    if !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let width = decimal_places as usize;
    let scale = scale_factor(decimal_places);
    let mut kept: String = frac_part.chars().take(width).collect();
    while kept.len() < width {
        kept.push('0');
    }
    let frac_value: u64 = if kept.is_empty() {
        0
    } else {
        kept.parse().map_err(|_| malformed())?
    };
    let round_up = frac_part
        .as_bytes()
        .get(width)
        .is_some_and(|&b| b >= b'5');

    let scaled = whole * scale + frac_value + if round_up { 1 } else { 0 };
    Ok(scaled)
}

/// Converts a scaled integer price back to a float for presentation.
pub fn unscale_price(price: u64, scale: u64) -> f64 {
    price as f64 / scale as f64
}
