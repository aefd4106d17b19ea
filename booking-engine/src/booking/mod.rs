//! Booking Module
//!
//! The consistency core: reservation lifecycle, slot allocation,
//! occupancy tracking and hold expiry.
//!
//! - **manager**: `BookingManager` state machine and atomic seat claims
//! - **slots**: room interval allocation and slot discovery
//! - **occupancy**: derived booked/capacity view
//! - **hold_reaper**: background sweep of expired holds
//!
//! # Data Flow
//!
//! 1. Caller builds a request plus `RequestMetadata`
//! 2. `BookingManager` validates against catalog facts and showings
//! 3. The seat claim runs inside the per-showing atomic region
//! 4. Occupancy is recomputed synchronously for the touched showing
//! 5. `BookingEvent`s are broadcast to all subscribers

pub mod hold_reaper;
pub mod manager;
pub mod occupancy;
pub mod slots;

// Re-exports
pub use hold_reaper::HoldReaper;
pub use manager::{BookingManager, ManagerError, ManagerResult};
pub use occupancy::OccupancySummary;
pub use slots::{AvailableSlots, SlotCandidate, SlotError};

/// Request metadata threaded through every engine operation
///
/// `timestamp` is captured once when the metadata is built and serves
/// as the single "now" for all sub-checks of the operation.
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// Request correlation ID (for audit tracing)
    pub command_id: String,
    pub actor_id: i64,
    /// Actor name (snapshot for audit)
    pub actor_name: String,
    /// Unix millis; the operation's single "now"
    pub timestamp: i64,
}

impl RequestMetadata {
    pub fn new(actor_id: i64, actor_name: impl Into<String>) -> Self {
        Self::at(actor_id, actor_name, shared::util::now_millis())
    }

    /// Build metadata with an explicit timestamp
    pub fn at(actor_id: i64, actor_name: impl Into<String>, timestamp: i64) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            actor_id,
            actor_name: actor_name.into(),
            timestamp,
        }
    }
}
