//! Pricing Engine
//!
//! Assembles a price quote from seat lines, concession lines and an
//! optional discount plan. Pure computation: re-running with the same
//! inputs yields the same quote, and the caller freezes the result into
//! the reservation snapshot.

use super::money::{round_money, to_decimal, to_f64};
use super::promotion::DiscountPlan;
use rust_decimal::Decimal;
use shared::booking::{AppliedPromotion, ConcessionLine};
use shared::models::SeatType;

/// A seat resolved to its type and price for one quote
#[derive(Debug, Clone, PartialEq)]
pub struct SeatLine {
    pub seat_code: String,
    pub seat_type: SeatType,
    pub price: f64,
}

/// Computed price snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub promotion: Option<AppliedPromotion>,
}

/// Compute a quote from resolved lines
///
/// `subtotal = Σ seat prices + Σ(unit price × qty)`;
/// `total = subtotal - discount`. All arithmetic in `Decimal`, rounded
/// to monetary precision at the line and aggregate level.
pub fn compute_quote(
    seat_lines: &[SeatLine],
    items: &[ConcessionLine],
    plan: Option<&DiscountPlan>,
) -> PriceQuote {
    let seats_total: Decimal = seat_lines.iter().map(|l| to_decimal(l.price)).sum();
    let items_total: Decimal = items.iter().map(|l| to_decimal(l.line_total)).sum();
    let subtotal = round_money(seats_total + items_total);

    let (discount, promotion) = match plan {
        Some(plan) => {
            let amount = plan.discount_for(subtotal);
            let applied = AppliedPromotion {
                code: plan.code.clone(),
                discount_type: plan.discount_type,
                value: plan.value,
                discount_amount: to_f64(amount),
            };
            (amount, Some(applied))
        }
        None => (Decimal::ZERO, None),
    };

    let total = round_money(subtotal - discount);

    PriceQuote {
        subtotal: to_f64(subtotal),
        discount: to_f64(discount),
        total: to_f64(total),
        promotion,
    }
}

/// Build a concession line with its frozen unit price
pub fn concession_line(
    concession_id: i64,
    name: impl Into<String>,
    unit_price: f64,
    quantity: i32,
) -> ConcessionLine {
    let line_total = round_money(to_decimal(unit_price) * Decimal::from(quantity));
    ConcessionLine {
        concession_id,
        name: name.into(),
        unit_price,
        quantity,
        line_total: to_f64(line_total),
    }
}
