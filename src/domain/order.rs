use crate::error::{EnrollmentError, Result};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// An order as created at the external payment provider.
///
/// Ephemeral by design: consumed by the verification step and then
/// discarded. The provider is the source of truth for order state, so a
/// failed or abandoned checkout leaves no residue here.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Order {
    /// Provider-assigned order reference.
    pub order_ref: String,
    /// Total in the smallest currency unit (paise, cents).
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
}

/// Sums course prices and converts to the smallest currency unit.
///
/// Decimal arithmetic throughout, so `[499, 999]` rupees is exactly
/// `149800` paise with no rounding drift.
pub fn total_minor_units<I>(prices: I) -> Result<u64>
where
    I: IntoIterator<Item = Decimal>,
{
    let total: Decimal = prices.into_iter().sum();
    (total * Decimal::ONE_HUNDRED)
        .round()
        .to_u64()
        .ok_or_else(|| EnrollmentError::Validation("order total out of range".to_string()))
}
