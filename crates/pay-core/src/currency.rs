//! # Currency
//!
//! The gateway only charges in US dollars. Amounts travel to and from the
//! provider in cents and are stored in dollars.

use rust_decimal::Decimal;

/// ISO 4217 code sent with every checkout line item
pub const CHECKOUT_CURRENCY: &str = "usd";

/// Convert an amount in minor units (cents) to major units.
///
/// The division by 100 is exact: 1050 -> 10.50, 999 -> 9.99.
pub fn minor_to_major(amount: i64) -> Decimal {
    Decimal::new(amount, 2)
}
