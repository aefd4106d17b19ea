//! Promotion Model

use serde::{Deserialize, Serialize};

/// Discount type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    Percent,
    Fixed,
}

/// Promotion entity (价格优惠码)
///
/// Eligibility/applicability rules are evaluated by the promotion
/// validator. `current_uses` is mutated only by the engine, exactly once
/// per reservation that commits past the hold stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Promotion {
    pub id: i64,
    /// Unique code, stored uppercase, matched case-insensitively
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    /// Percent: 10 = 10% off; Fixed: absolute amount
    pub value: f64,
    /// Cap on the computed discount amount (percent type only)
    pub max_discount: Option<f64>,
    /// Validity window (Unix millis, inclusive)
    pub valid_from: i64,
    pub valid_until: i64,
    /// Total usage cap; None = unlimited
    pub max_uses: Option<u32>,
    pub current_uses: u32,
    /// Minimum order amount before discount
    pub min_order_amount: Option<f64>,

    // === Applicability (all empty = unconditional) ===
    /// Explicit showing allow-list
    #[serde(default)]
    pub showing_ids: Vec<i64>,
    /// Movie allow-list (checked when showing list is empty)
    #[serde(default)]
    pub movie_ids: Vec<i64>,
    /// Genre allow-list (checked when showing and movie lists are empty)
    #[serde(default)]
    pub genres: Vec<String>,

    // === Customer eligibility ===
    /// Only customers with zero prior paid reservations
    #[serde(default)]
    pub first_time_only: bool,
    /// Minimum count of prior paid reservations
    pub min_prior_orders: Option<u32>,
    /// Each customer may carry this code on at most one
    /// non-cancelled reservation
    #[serde(default)]
    pub one_use_per_customer: bool,

    pub is_active: bool,
    pub created_at: i64,
}

impl Promotion {
    /// Normalize a code for storage and lookup
    pub fn normalize_code(code: &str) -> String {
        code.trim().to_uppercase()
    }

    /// Remaining usage slots; None = unlimited
    pub fn remaining_uses(&self) -> Option<u32> {
        self.max_uses.map(|cap| cap.saturating_sub(self.current_uses))
    }
}

/// Create promotion payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromotionCreate {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub value: f64,
    pub max_discount: Option<f64>,
    pub valid_from: i64,
    pub valid_until: i64,
    pub max_uses: Option<u32>,
    pub min_order_amount: Option<f64>,
    pub showing_ids: Option<Vec<i64>>,
    pub movie_ids: Option<Vec<i64>>,
    pub genres: Option<Vec<String>>,
    pub first_time_only: Option<bool>,
    pub min_prior_orders: Option<u32>,
    pub one_use_per_customer: Option<bool>,
}
