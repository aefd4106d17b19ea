//! Reservation and showing snapshots
//!
//! A reservation's monetary fields are a frozen price snapshot: once
//! the reservation leaves `Pending` the stored `subtotal`/`discount`/
//! `total` are authoritative and are never recomputed from the
//! showing's price table or the promotion's rules.

use super::types::PaymentStatus;
use crate::models::{DiscountType, SeatType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Showing
// ============================================================================

/// Showing status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShowingStatus {
    #[default]
    Scheduled,
    Cancelled,
    Completed,
}

/// A scheduled screening of a movie in a specific room
///
/// Never deleted; a freed interval is represented by `Cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Showing {
    pub id: i64,
    pub movie_id: i64,
    pub room_id: i64,
    /// Interval `[start_time, end_time)` in Unix millis; the end
    /// includes the cleaning buffer
    pub start_time: i64,
    pub end_time: i64,
    /// Per-seat-type prices, frozen at creation
    pub seat_prices: HashMap<SeatType, f64>,
    pub status: ShowingStatus,
    /// Derived: booked seats >= room capacity
    #[serde(default)]
    pub is_full: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Showing {
    /// Whether this showing still occupies its room interval
    pub fn blocks_interval(&self) -> bool {
        self.status != ShowingStatus::Cancelled
    }
}

// ============================================================================
// Reservation
// ============================================================================

/// Reservation status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
    Refunded,
}

impl ReservationStatus {
    /// Terminal states accept no further customer-driven mutation
    pub fn is_final(self) -> bool {
        matches!(self, Self::Cancelled | Self::Refunded)
    }
}

/// Concession line frozen into a reservation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConcessionLine {
    pub concession_id: i64,
    /// Name snapshot (for receipts/audit)
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    /// unit_price * quantity, rounded
    pub line_total: f64,
}

/// Promotion application frozen at reservation creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppliedPromotion {
    pub code: String,
    pub discount_type: DiscountType,
    pub value: f64,
    /// Resulting discount amount, never recomputed
    pub discount_amount: f64,
}

/// Manual cancellation audit record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CancellationRecord {
    pub actor_id: i64,
    pub actor_name: String,
    pub reason: String,
    pub timestamp: i64,
}

/// Reservation snapshot - the engine's unit of state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationSnapshot {
    /// Reservation ID (assigned by the engine)
    pub reservation_id: String,
    pub showing_id: i64,
    pub customer_id: i64,
    /// Claimed seat codes, unique within the reservation
    pub seats: Vec<String>,
    /// Concession lines with frozen unit prices
    pub items: Vec<ConcessionLine>,
    /// Applied promotion snapshot, frozen at creation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<AppliedPromotion>,
    /// Σ seat prices + Σ line totals
    pub subtotal: f64,
    #[serde(default)]
    pub discount: f64,
    /// subtotal - discount
    pub total: f64,
    pub status: ReservationStatus,
    pub payment_status: PaymentStatus,
    /// Hold deadline (Unix millis); a `Pending` reservation past this
    /// instant is treated as released even before the sweep reclaims it
    pub hold_expires_at: i64,
    /// Guards the at-most-once promotion usage increment
    #[serde(default)]
    pub promotion_committed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancellation: Option<CancellationRecord>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ReservationSnapshot {
    /// Whether this reservation currently excludes its seats from
    /// other bookings, evaluated against the caller-captured `now`
    pub fn holds_seats(&self, now: i64) -> bool {
        match self.status {
            ReservationStatus::Pending => now < self.hold_expires_at,
            ReservationStatus::Confirmed => true,
            ReservationStatus::Cancelled | ReservationStatus::Refunded => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_reservation(hold_expires_at: i64) -> ReservationSnapshot {
        ReservationSnapshot {
            reservation_id: "r-1".to_string(),
            showing_id: 1,
            customer_id: 1,
            seats: vec!["A1".to_string()],
            items: vec![],
            promotion: None,
            subtotal: 100.0,
            discount: 0.0,
            total: 100.0,
            status: ReservationStatus::Pending,
            payment_status: PaymentStatus::Pending,
            hold_expires_at,
            promotion_committed: false,
            cancellation: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_pending_holds_seats_until_expiry() {
        let r = pending_reservation(1_000);
        assert!(r.holds_seats(999));
        assert!(!r.holds_seats(1_000));
        assert!(!r.holds_seats(2_000));
    }

    #[test]
    fn test_terminal_states_never_hold_seats() {
        let mut r = pending_reservation(i64::MAX);
        r.status = ReservationStatus::Cancelled;
        assert!(!r.holds_seats(0));
        r.status = ReservationStatus::Refunded;
        assert!(!r.holds_seats(0));
    }

    #[test]
    fn test_confirmed_holds_seats_past_expiry() {
        let mut r = pending_reservation(1_000);
        r.status = ReservationStatus::Confirmed;
        assert!(r.holds_seats(2_000));
    }
}
