//! Booking events - immutable facts broadcast after state changes
//!
//! External consumers (notification fan-out, analytics, logging) may
//! react to these or ignore them; the engine never waits on a receiver.

use super::snapshot::ReservationStatus;
use serde::{Deserialize, Serialize};

/// Booking event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingEvent {
    /// Event unique ID
    pub event_id: String,
    /// Global sequence number (for ordering and replay)
    pub sequence: u64,
    /// Engine timestamp (Unix milliseconds)
    pub timestamp: i64,
    /// Event type
    pub event_type: BookingEventType,
    /// Event payload
    pub payload: EventPayload,
}

impl BookingEvent {
    pub fn new(sequence: u64, timestamp: i64, payload: EventPayload) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            sequence,
            timestamp,
            event_type: payload.event_type(),
            payload,
        }
    }
}

/// Event type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingEventType {
    // Slots
    ShowingScheduled,
    ShowingCancelled,

    // Reservations
    ReservationStateChanged,

    // Derived state
    OccupancyChanged,

    // Promotions
    PromotionUsed,
}

impl std::fmt::Display for BookingEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingEventType::ShowingScheduled => write!(f, "SHOWING_SCHEDULED"),
            BookingEventType::ShowingCancelled => write!(f, "SHOWING_CANCELLED"),
            BookingEventType::ReservationStateChanged => write!(f, "RESERVATION_STATE_CHANGED"),
            BookingEventType::OccupancyChanged => write!(f, "OCCUPANCY_CHANGED"),
            BookingEventType::PromotionUsed => write!(f, "PROMOTION_USED"),
        }
    }
}

/// Event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", tag = "type")]
pub enum EventPayload {
    ShowingScheduled {
        showing_id: i64,
        room_id: i64,
        movie_id: i64,
        start_time: i64,
        end_time: i64,
    },
    ShowingCancelled {
        showing_id: i64,
    },
    ReservationStateChanged {
        reservation_id: String,
        showing_id: i64,
        /// None on creation
        old_status: Option<ReservationStatus>,
        new_status: ReservationStatus,
    },
    OccupancyChanged {
        showing_id: i64,
        booked_seats: usize,
        capacity: usize,
        is_full: bool,
    },
    PromotionUsed {
        code: String,
        reservation_id: String,
    },
}

impl EventPayload {
    /// Event type for this payload
    pub fn event_type(&self) -> BookingEventType {
        match self {
            EventPayload::ShowingScheduled { .. } => BookingEventType::ShowingScheduled,
            EventPayload::ShowingCancelled { .. } => BookingEventType::ShowingCancelled,
            EventPayload::ReservationStateChanged { .. } => {
                BookingEventType::ReservationStateChanged
            }
            EventPayload::OccupancyChanged { .. } => BookingEventType::OccupancyChanged,
            EventPayload::PromotionUsed { .. } => BookingEventType::PromotionUsed,
        }
    }
}
