//! Shared types for the cinema booking backend
//!
//! Common types used across the engine and its callers: master-data
//! models, booking wire types (snapshots, events, error codes), and
//! id/time utilities.

pub mod booking;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Booking re-exports (for convenient access)
pub use booking::{BookingErrorCode, BookingEvent, CommandError, ReservationSnapshot, Showing};
