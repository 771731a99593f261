//! Integer-cents money representation.
//!
//! # Design invariant
//!
//! All prices inside the service are `i64` integer cents (1 unit =
//! 100 cents). Catalog prices carry exactly two decimal places, so cents are
//! lossless and summing them never drifts the way `f64` arithmetic can.
//!
//! String conversions are performed **only** at the wire boundary: JSON
//! responses render prices as 2-dp strings (`"7.50"`), matching the fixed
//! decimal precision of the catalog. No other code path should produce or
//! consume textual prices.

/// Scale factor: 1 price unit = 100 cents (2 decimal places).
pub const CENTS_PER_UNIT: i64 = 100;

/// Render integer cents as a fixed 2-dp decimal string, e.g. `750` → `"7.50"`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!(
        "{sign}{}.{:02}",
        abs / CENTS_PER_UNIT as u64,
        abs % CENTS_PER_UNIT as u64
    )
}
