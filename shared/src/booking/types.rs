//! Shared types for the booking engine

use crate::models::SeatType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ============================================================================
// Payment Types
// ============================================================================

/// Payment status of a reservation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

/// Terminal status reported by the external payment collaborator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentOutcomeStatus {
    Success,
    Failed,
    Refunded,
}

/// Inbound payment-outcome event
///
/// The engine never calls out to the payment collaborator; it only
/// consumes this terminal status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub reservation_id: String,
    pub status: PaymentOutcomeStatus,
    pub amount: f64,
    pub method: String,
}

// ============================================================================
// Request Inputs
// ============================================================================

/// Concession line item as requested by the customer
///
/// Name and unit price are resolved from the catalog at reservation
/// time and frozen into the snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConcessionLineInput {
    pub concession_id: i64,
    pub quantity: i32,
}

/// Create reservation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateReservation {
    pub showing_id: i64,
    pub customer_id: i64,
    /// Requested seat codes, e.g. ["A1", "B3"]
    pub seats: Vec<String>,
    #[serde(default)]
    pub items: Vec<ConcessionLineInput>,
    pub promotion_code: Option<String>,
}

/// Create showing request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowingCreate {
    pub movie_id: i64,
    pub room_id: i64,
    /// Screening start (Unix millis); end is derived from movie
    /// duration plus the configured cleaning buffer
    pub start_time: i64,
    /// Per-seat-type price table, frozen into the showing
    pub seat_prices: HashMap<SeatType, f64>,
}

// ============================================================================
// Command Errors
// ============================================================================

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: BookingErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: BookingErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes (caller is responsible for localization)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingErrorCode {
    SeatConflict,
    RoomConflict,
    ShowingUnavailable,
    PromotionRejected,
    HoldExpired,
    AlreadyFinal,
    ReservationNotFound,
    InvalidRequest,
    InternalError,
}
