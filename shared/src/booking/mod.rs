//! Booking Module Types
//!
//! This module provides the types shared between the booking engine and
//! its callers:
//! - Inputs: reservation / showing requests and the inbound payment
//!   outcome event
//! - Snapshots: reservation and showing state with frozen price data
//! - Events: immutable facts broadcast after every state change
//! - Error codes: wire-level classification of engine errors

pub mod event;
pub mod snapshot;
pub mod types;

// Re-exports
pub use event::{BookingEvent, BookingEventType, EventPayload};
pub use snapshot::{
    AppliedPromotion, CancellationRecord, ConcessionLine, ReservationSnapshot, ReservationStatus,
    Showing, ShowingStatus,
};
pub use types::*;
