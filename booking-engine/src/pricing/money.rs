//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted
//! to `f64` for storage/serialization.

use crate::booking::manager::ManagerError;
use rust_decimal::prelude::*;
use shared::booking::ConcessionLineInput;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed price per seat or concession unit
const MAX_PRICE: f64 = 10_000_000.0;
/// Maximum allowed quantity per concession line
const MAX_QUANTITY: i32 = 999;
/// Maximum seats in one reservation
pub const MAX_SEATS_PER_RESERVATION: usize = 10;

/// Convert f64 to Decimal for monetary calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Round a Decimal to monetary precision
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), ManagerError> {
    if !value.is_finite() {
        return Err(ManagerError::InvalidRequest(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a unit price before it enters a computation
pub fn validate_price(price: f64, field_name: &str) -> Result<(), ManagerError> {
    require_finite(price, field_name)?;
    if price < 0.0 {
        return Err(ManagerError::InvalidRequest(format!(
            "{} must be non-negative, got {}",
            field_name, price
        )));
    }
    if price > MAX_PRICE {
        return Err(ManagerError::InvalidRequest(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PRICE, price
        )));
    }
    Ok(())
}

/// Validate a ConcessionLineInput before processing
pub fn validate_concession_line(line: &ConcessionLineInput) -> Result<(), ManagerError> {
    if line.quantity <= 0 {
        return Err(ManagerError::InvalidRequest(format!(
            "quantity must be positive, got {} for concession {}",
            line.quantity, line.concession_id
        )));
    }
    if line.quantity > MAX_QUANTITY {
        return Err(ManagerError::InvalidRequest(format!(
            "quantity exceeds maximum allowed ({}), got {} for concession {}",
            MAX_QUANTITY, line.quantity, line.concession_id
        )));
    }
    Ok(())
}

/// Compare two monetary f64 values within tolerance
pub fn amounts_equal(a: f64, b: f64) -> bool {
    (to_decimal(a) - to_decimal(b)).abs() <= MONEY_TOLERANCE
}
