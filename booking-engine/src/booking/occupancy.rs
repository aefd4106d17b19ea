//! Occupancy Tracker - derived booked/capacity view per showing
//!
//! Recomputed synchronously as part of the same logical operation that
//! changed occupancy, never eventually. Finding more booked seats than
//! capacity means the seat-claim atomic region was broken; that is
//! fatal and aborts loudly instead of being tolerated.

use serde::Serialize;
use shared::booking::ReservationSnapshot;

/// Derived occupancy state for one showing
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct OccupancySummary {
    pub booked_seats: usize,
    pub capacity: usize,
    pub is_full: bool,
}

/// Recompute occupancy from the showing's reservations
///
/// Counts seats across all reservations that still hold their seats at
/// `now` (pending-unexpired and confirmed).
///
/// # Panics
///
/// Panics when booked seats exceed capacity - a broken seat-claim
/// atomic region, which must abort the operation rather than produce
/// silently corrupt derived state.
pub fn recompute<'a>(
    showing_id: i64,
    capacity: usize,
    reservations: impl Iterator<Item = &'a ReservationSnapshot>,
    now: i64,
) -> OccupancySummary {
    let booked_seats: usize = reservations
        .filter(|r| r.holds_seats(now))
        .map(|r| r.seats.len())
        .sum();

    if booked_seats > capacity {
        tracing::error!(
            showing_id,
            booked_seats,
            capacity,
            "Booked seats exceed room capacity, seat-claim atomicity was violated"
        );
        panic!(
            "occupancy invariant violated for showing {}: {} booked > {} capacity",
            showing_id, booked_seats, capacity
        );
    }

    OccupancySummary {
        booked_seats,
        capacity,
        is_full: booked_seats >= capacity,
    }
}
