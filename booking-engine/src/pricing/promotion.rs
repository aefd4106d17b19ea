//! Promotion Validator
//!
//! Evaluates a promotion code against its eligibility rules and returns
//! a frozen discount plan. Checks run in a fixed order and short-circuit
//! on the first failure; every rejection carries a specific reason.
//!
//! The validator never mutates state. Usage-counter commits happen in
//! the manager, inside the per-promotion atomic region, when a
//! reservation is confirmed.

use super::money::{round_money, to_decimal, to_f64};
use rust_decimal::Decimal;
use shared::models::{DiscountType, Promotion};
use thiserror::Error;

/// Rejection reasons, one per failed rule
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PromotionRejection {
    #[error("Promotion not found: {0}")]
    NotFound(String),

    #[error("Promotion expired or not active: {0}")]
    Expired(String),

    #[error("Promotion usage exhausted: {0}")]
    Exhausted(String),

    #[error("Order amount below minimum {required:.2} for promotion {code}")]
    BelowMinimum { code: String, required: f64 },

    #[error("Promotion {0} is not applicable to this showing")]
    Inapplicable(String),

    #[error("Customer not eligible for promotion {code}: {reason}")]
    Ineligible { code: String, reason: String },
}

/// Customer facts needed for eligibility checks
///
/// Computed by the caller from its reservation store; the validator
/// stays a pure function.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomerStats {
    /// Prior reservations that reached a paid state
    pub prior_paid_reservations: u32,
    /// Prior non-cancelled reservations carrying this code
    pub prior_uses_of_code: u32,
}

/// Showing facts needed for applicability checks
#[derive(Debug, Clone)]
pub struct ShowingFacts {
    pub showing_id: i64,
    pub movie_id: i64,
    pub genres: Vec<String>,
}

/// Frozen discount computation returned on success
///
/// Carries everything needed to compute and audit the discount; immune
/// to later edits of the promotion record.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountPlan {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: f64,
    pub max_discount: Option<f64>,
}

impl DiscountPlan {
    /// Discount amount for an order subtotal
    ///
    /// Percent: `amount * value / 100`, capped at `max_discount`.
    /// Fixed: `min(value, amount)`.
    pub fn discount_for(&self, amount: Decimal) -> Decimal {
        let discount = match self.discount_type {
            DiscountType::Percent => {
                let raw = amount * to_decimal(self.value) / Decimal::ONE_HUNDRED;
                match self.max_discount {
                    Some(cap) => raw.min(to_decimal(cap)),
                    None => raw,
                }
            }
            DiscountType::Fixed => to_decimal(self.value).min(amount),
        };
        round_money(discount.max(Decimal::ZERO))
    }
}

/// Validate a promotion for one order
///
/// `now` is captured once by the calling operation and threaded through
/// so all sub-checks see the same instant.
pub fn validate(
    promotion: &Promotion,
    customer: &CustomerStats,
    order_amount: Decimal,
    showing: &ShowingFacts,
    now: i64,
) -> Result<DiscountPlan, PromotionRejection> {
    // 1. Active flag and validity window
    if !promotion.is_active || now < promotion.valid_from || now > promotion.valid_until {
        return Err(PromotionRejection::Expired(promotion.code.clone()));
    }

    // 2. Usage cap
    if promotion.remaining_uses() == Some(0) {
        return Err(PromotionRejection::Exhausted(promotion.code.clone()));
    }

    // 3. Minimum order amount
    if let Some(min) = promotion.min_order_amount
        && order_amount < to_decimal(min)
    {
        return Err(PromotionRejection::BelowMinimum {
            code: promotion.code.clone(),
            required: min,
        });
    }

    // 4. Showing applicability: explicit showing list, else movie list,
    //    else genre list, else unconditional
    if !is_applicable(promotion, showing) {
        return Err(PromotionRejection::Inapplicable(promotion.code.clone()));
    }

    // 5. Customer eligibility
    check_eligibility(promotion, customer)?;

    Ok(DiscountPlan {
        code: promotion.code.clone(),
        discount_type: promotion.discount_type,
        value: promotion.value,
        max_discount: promotion.max_discount,
    })
}

fn is_applicable(promotion: &Promotion, showing: &ShowingFacts) -> bool {
    if !promotion.showing_ids.is_empty() {
        return promotion.showing_ids.contains(&showing.showing_id);
    }
    if !promotion.movie_ids.is_empty() {
        return promotion.movie_ids.contains(&showing.movie_id);
    }
    if !promotion.genres.is_empty() {
        return showing
            .genres
            .iter()
            .any(|g| promotion.genres.iter().any(|p| p.eq_ignore_ascii_case(g)));
    }
    true
}

fn check_eligibility(
    promotion: &Promotion,
    customer: &CustomerStats,
) -> Result<(), PromotionRejection> {
    if promotion.first_time_only && customer.prior_paid_reservations > 0 {
        return Err(PromotionRejection::Ineligible {
            code: promotion.code.clone(),
            reason: "first-time customers only".to_string(),
        });
    }
    if let Some(min) = promotion.min_prior_orders
        && customer.prior_paid_reservations < min
    {
        return Err(PromotionRejection::Ineligible {
            code: promotion.code.clone(),
            reason: format!("requires at least {} prior paid orders", min),
        });
    }
    if promotion.one_use_per_customer && customer.prior_uses_of_code > 0 {
        return Err(PromotionRejection::Ineligible {
            code: promotion.code.clone(),
            reason: "code already used by this customer".to_string(),
        });
    }
    Ok(())
}
