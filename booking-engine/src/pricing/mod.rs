//! Pricing Module
//!
//! Deterministic price computation for reservations:
//!
//! - **money**: rust_decimal arithmetic and input guards
//! - **promotion**: promotion code validation and discount plans
//! - **engine**: seat + concession + discount quote assembly
//!
//! Everything here is pure computation over caller-provided facts. The
//! resulting quote is frozen into the reservation snapshot and never
//! recomputed after the reservation leaves the pending state.

pub mod engine;
pub mod money;
pub mod promotion;

// Re-exports
pub use engine::{PriceQuote, SeatLine};
pub use promotion::{CustomerStats, DiscountPlan, PromotionRejection, ShowingFacts};
