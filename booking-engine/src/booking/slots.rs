//! Slot allocation - non-overlapping room intervals for showings
//!
//! Interval semantics are half-open `[start, end)`: a showing ending at
//! 16:00 does not conflict with one starting at 16:00. The overlap
//! check itself is pure; the manager runs it inside the per-room atomic
//! region so concurrent `create_showing` calls cannot both land on the
//! same interval.

use serde::Serialize;
use shared::booking::Showing;
use thiserror::Error;

/// Slot allocation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SlotError {
    #[error("Room interval conflicts with showing {existing_showing_id}")]
    RoomConflict { existing_showing_id: i64 },

    #[error("Room not found: {0}")]
    RoomNotFound(i64),

    #[error("Movie not found: {0}")]
    MovieNotFound(i64),

    #[error("Showing not found: {0}")]
    ShowingNotFound(i64),

    #[error("Invalid interval: {0}")]
    InvalidInterval(String),
}

/// Half-open interval overlap test
#[inline]
pub fn overlaps(a_start: i64, a_end: i64, b_start: i64, b_end: i64) -> bool {
    a_start < b_end && b_start < a_end
}

/// Find a non-cancelled showing in `room_id` whose interval intersects
/// `[start, end)`, returning its id
pub fn find_conflict<'a>(
    showings: impl Iterator<Item = &'a Showing>,
    room_id: i64,
    start: i64,
    end: i64,
) -> Option<i64> {
    showings
        .filter(|s| s.room_id == room_id && s.blocks_interval())
        .find(|s| overlaps(start, end, s.start_time, s.end_time))
        .map(|s| s.id)
}

/// Candidate interval produced by slot discovery
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct SlotCandidate {
    pub start: i64,
    /// Includes the cleaning buffer; this is the interval a subsequent
    /// `create_showing` would occupy
    pub end: i64,
}

/// Lazy, finite, restartable sequence of free slots in one room's day
///
/// Scans the operating window at a fixed step, skipping candidates that
/// intersect a busy interval. Discovery only: the busy set is a
/// snapshot taken at construction, and `create_showing` re-validates
/// under the room lock. Clone to restart from the window start.
#[derive(Debug, Clone)]
pub struct AvailableSlots {
    cursor: i64,
    window_end: i64,
    step: i64,
    /// Full occupied length of a candidate (runtime + cleaning buffer)
    duration: i64,
    /// Busy `[start, end)` intervals, snapshot at construction
    busy: Vec<(i64, i64)>,
}

impl AvailableSlots {
    pub fn new(
        window_start: i64,
        window_end: i64,
        step: i64,
        duration: i64,
        mut busy: Vec<(i64, i64)>,
    ) -> Self {
        busy.sort_unstable();
        Self {
            cursor: window_start,
            window_end,
            step,
            duration,
            busy,
        }
    }

    fn is_free(&self, start: i64, end: i64) -> bool {
        !self
            .busy
            .iter()
            .any(|&(b_start, b_end)| overlaps(start, end, b_start, b_end))
    }
}

impl Iterator for AvailableSlots {
    type Item = SlotCandidate;

    fn next(&mut self) -> Option<SlotCandidate> {
        while self.cursor + self.duration <= self.window_end {
            let start = self.cursor;
            let end = start + self.duration;
            self.cursor += self.step;
            if self.is_free(start, end) {
                return Some(SlotCandidate { start, end });
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: i64 = 60_000;

    #[test]
    fn test_overlap_half_open_semantics() {
        // [0, 100) vs [100, 200): touching boundaries do not conflict
        assert!(!overlaps(0, 100, 100, 200));
        assert!(!overlaps(100, 200, 0, 100));
        assert!(overlaps(0, 101, 100, 200));
        assert!(overlaps(100, 200, 150, 160));
        assert!(overlaps(150, 160, 100, 200));
    }

    #[test]
    fn test_iterator_skips_busy_intervals() {
        // Window 0..8h, 2h slots on a 2h step, busy 2h..4h
        let slots = AvailableSlots::new(0, 8 * 60 * MIN, 120 * MIN, 120 * MIN, vec![(
            2 * 60 * MIN,
            4 * 60 * MIN,
        )]);
        let starts: Vec<i64> = slots.map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 4 * 60 * MIN, 6 * 60 * MIN]);
    }

    #[test]
    fn test_iterator_is_finite_and_respects_window_end() {
        // A slot must fully fit before the window closes
        let slots = AvailableSlots::new(0, 100 * MIN, 30 * MIN, 90 * MIN, vec![]);
        let starts: Vec<i64> = slots.map(|s| s.start).collect();
        assert_eq!(starts, vec![0]);
    }

    #[test]
    fn test_iterator_restartable_via_clone() {
        let slots = AvailableSlots::new(0, 6 * 60 * MIN, 60 * MIN, 60 * MIN, vec![]);
        let first: Vec<i64> = slots.clone().map(|s| s.start).collect();
        let second: Vec<i64> = slots.map(|s| s.start).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn test_candidate_adjacent_to_busy_interval_is_free() {
        // Busy 2h..4h; a 2h candidate at 0 (ends exactly at the busy
        // start) and one at 4h (starts exactly at the busy end) are fine
        let slots = AvailableSlots::new(0, 6 * 60 * MIN, 60 * MIN, 120 * MIN, vec![(
            2 * 60 * MIN,
            4 * 60 * MIN,
        )]);
        let starts: Vec<i64> = slots.map(|s| s.start).collect();
        assert_eq!(starts, vec![0, 4 * 60 * MIN]);
    }
}
