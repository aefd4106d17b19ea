//! BookingManager - reservation lifecycle and atomic seat claims
//!
//! This module handles:
//! - Reservation creation with race-free seat claims
//! - Payment-outcome driven transitions (confirm / fail / refund)
//! - Hold expiry (lazy at use sites + explicit sweep)
//! - Slot allocation for showings (per-room interval uniqueness)
//! - Synchronous occupancy recomputation
//! - Event broadcasting to subscribers
//!
//! # Reservation Flow
//!
//! ```text
//! create_reservation(input, meta)
//!     ├─ 1. Validate seat list and concession lines
//!     ├─ 2. Validate showing is scheduled and in the future
//!     ├─ 3. Resolve seats against the room layout
//!     ├─ 4. Resolve concession prices from the catalog
//!     ├─ 5. Validate promotion and build the discount plan
//!     ├─ 6. Compute the price snapshot
//!     ├─ 7. Claim seats (per-showing atomic region)
//!     ├─ 8. Recompute occupancy
//!     └─ 9. Broadcast events and return the snapshot
//! ```
//!
//! # Atomic Regions
//!
//! Three keyed scoped locks make the atomicity explicit so tests can
//! inject contention:
//! - seat claim, keyed by showing id
//! - room interval reservation, keyed by room id
//! - promotion usage commit, keyed by normalized code

mod error;
pub use error::*;

use crate::booking::occupancy::{self, OccupancySummary};
use crate::booking::slots::{self, AvailableSlots, SlotError};
use crate::booking::RequestMetadata;
use crate::catalog::CatalogService;
use crate::config::EngineConfig;
use crate::pricing::engine::{self, SeatLine};
use crate::pricing::money;
use crate::pricing::promotion::{self, CustomerStats, PromotionRejection, ShowingFacts};
use chrono::{NaiveDate, NaiveTime};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use shared::booking::{
    BookingEvent, CancellationRecord, CreateReservation, EventPayload, PaymentOutcome,
    PaymentOutcomeStatus, PaymentStatus, ReservationSnapshot, ReservationStatus, Showing,
    ShowingCreate, ShowingStatus,
};
use shared::models::Promotion;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Event broadcast channel capacity (bursts of claims + sweeps)
const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// In-memory reservation store with a per-showing index
#[derive(Default)]
struct ReservationStore {
    by_id: HashMap<String, ReservationSnapshot>,
    by_showing: HashMap<i64, Vec<String>>,
}

impl ReservationStore {
    fn insert(&mut self, snapshot: ReservationSnapshot) {
        self.by_showing
            .entry(snapshot.showing_id)
            .or_default()
            .push(snapshot.reservation_id.clone());
        self.by_id
            .insert(snapshot.reservation_id.clone(), snapshot);
    }

    fn get(&self, reservation_id: &str) -> Option<&ReservationSnapshot> {
        self.by_id.get(reservation_id)
    }

    fn get_mut(&mut self, reservation_id: &str) -> Option<&mut ReservationSnapshot> {
        self.by_id.get_mut(reservation_id)
    }

    fn for_showing(&self, showing_id: i64) -> impl Iterator<Item = &ReservationSnapshot> {
        self.by_showing
            .get(&showing_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }

    fn values(&self) -> impl Iterator<Item = &ReservationSnapshot> {
        self.by_id.values()
    }
}

/// BookingManager - the reservation state machine
///
/// The `epoch` field is a unique identifier generated on each startup.
/// Subscribers use it to detect engine restarts and drop stale state.
pub struct BookingManager {
    catalog: Arc<CatalogService>,
    config: EngineConfig,
    showings: RwLock<HashMap<i64, Showing>>,
    state: RwLock<ReservationStore>,
    /// Promotion registry keyed by normalized code
    promotions: RwLock<HashMap<String, Promotion>>,
    /// Per-showing seat-claim locks
    seat_locks: DashMap<i64, Arc<Mutex<()>>>,
    /// Per-room interval locks
    room_locks: DashMap<i64, Arc<Mutex<()>>>,
    /// Per-promotion usage locks
    promo_locks: DashMap<String, Arc<Mutex<()>>>,
    event_tx: broadcast::Sender<BookingEvent>,
    sequence: AtomicU64,
    /// Engine instance epoch - unique ID generated on startup
    epoch: String,
}

impl std::fmt::Debug for BookingManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingManager")
            .field("epoch", &self.epoch)
            .field("showings", &self.showings.read().len())
            .field("reservations", &self.state.read().by_id.len())
            .finish()
    }
}

impl BookingManager {
    /// Create a new BookingManager over the given catalog
    pub fn new(catalog: Arc<CatalogService>, config: EngineConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let epoch = uuid::Uuid::new_v4().to_string();
        tracing::info!(epoch = %epoch, "BookingManager started with new epoch");
        Self {
            catalog,
            config,
            showings: RwLock::new(HashMap::new()),
            state: RwLock::new(ReservationStore::default()),
            promotions: RwLock::new(HashMap::new()),
            seat_locks: DashMap::new(),
            room_locks: DashMap::new(),
            promo_locks: DashMap::new(),
            event_tx,
            sequence: AtomicU64::new(0),
            epoch,
        }
    }

    /// Get the engine epoch (unique instance ID)
    pub fn epoch(&self) -> &str {
        &self.epoch
    }

    /// Subscribe to event broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.event_tx.subscribe()
    }

    /// Engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Slot Allocation
    // ========================================================================

    /// Schedule a showing, reserving its room interval
    ///
    /// The end time is derived from the movie runtime plus the cleaning
    /// buffer. Overlap check and insert run inside the per-room atomic
    /// region; concurrent attempts on overlapping intervals cannot both
    /// succeed.
    pub fn create_showing(
        &self,
        input: ShowingCreate,
        meta: &RequestMetadata,
    ) -> ManagerResult<Showing> {
        let now = meta.timestamp;

        // 1. Resolve facts from the catalog
        let duration_minutes = self
            .catalog
            .movie_duration_minutes(input.movie_id)
            .ok_or(SlotError::MovieNotFound(input.movie_id))?;
        if duration_minutes <= 0 {
            return Err(SlotError::InvalidInterval(format!(
                "movie {} has non-positive runtime",
                input.movie_id
            ))
            .into());
        }
        if self.catalog.get_room(input.room_id).is_none() {
            return Err(SlotError::RoomNotFound(input.room_id).into());
        }

        // 2. Validate the price table
        if input.seat_prices.is_empty() {
            return Err(ManagerError::InvalidRequest(
                "seat price table is empty".to_string(),
            ));
        }
        for price in input.seat_prices.values() {
            money::validate_price(*price, "seat price")?;
        }

        // 3. Derive the occupied interval
        let start = input.start_time;
        let end = start + duration_minutes * 60_000 + self.config.cleaning_buffer_millis();

        let showing = Showing {
            id: shared::util::snowflake_id(),
            movie_id: input.movie_id,
            room_id: input.room_id,
            start_time: start,
            end_time: end,
            seat_prices: input.seat_prices,
            status: ShowingStatus::Scheduled,
            is_full: false,
            created_at: now,
            updated_at: now,
        };

        // 4. Atomic region: overlap check + insert under the room lock
        {
            let lock = self.room_lock(input.room_id);
            let _guard = lock.lock();
            let mut showings = self.showings.write();
            if let Some(existing) = slots::find_conflict(showings.values(), input.room_id, start, end)
            {
                return Err(SlotError::RoomConflict {
                    existing_showing_id: existing,
                }
                .into());
            }
            showings.insert(showing.id, showing.clone());
        }

        self.emit(now, EventPayload::ShowingScheduled {
            showing_id: showing.id,
            room_id: showing.room_id,
            movie_id: showing.movie_id,
            start_time: showing.start_time,
            end_time: showing.end_time,
        });
        tracing::info!(
            showing_id = showing.id,
            room_id = showing.room_id,
            start,
            end,
            "Showing scheduled"
        );
        Ok(showing)
    }

    /// Cancel a showing, freeing its room interval for reuse
    ///
    /// History is kept; the showing is never deleted.
    pub fn cancel_showing(
        &self,
        showing_id: i64,
        meta: &RequestMetadata,
    ) -> ManagerResult<Showing> {
        let now = meta.timestamp;
        let snapshot = {
            let mut showings = self.showings.write();
            let showing = showings
                .get_mut(&showing_id)
                .ok_or(SlotError::ShowingNotFound(showing_id))?;
            if showing.status != ShowingStatus::Scheduled {
                return Err(ManagerError::InvalidRequest(format!(
                    "showing {} is not scheduled",
                    showing_id
                )));
            }
            showing.status = ShowingStatus::Cancelled;
            showing.updated_at = now;
            showing.clone()
        };

        self.emit(now, EventPayload::ShowingCancelled { showing_id });
        tracing::info!(showing_id, "Showing cancelled");
        Ok(snapshot)
    }

    /// Discover free slots for a room on one day
    ///
    /// Returns a lazy, restartable iterator over candidate intervals.
    /// Advisory only: `create_showing` re-validates under the room
    /// lock.
    pub fn find_available_slots(
        &self,
        room_id: i64,
        date: NaiveDate,
        movie_duration_minutes: i64,
    ) -> ManagerResult<AvailableSlots> {
        if movie_duration_minutes <= 0 {
            return Err(SlotError::InvalidInterval(format!(
                "non-positive duration: {} minutes",
                movie_duration_minutes
            ))
            .into());
        }
        if self.catalog.get_room(room_id).is_none() {
            return Err(SlotError::RoomNotFound(room_id).into());
        }

        let window_start = self.local_millis(date, self.config.opening_time)?;
        let window_end = self.local_millis(date, self.config.closing_time)?;
        let busy: Vec<(i64, i64)> = self
            .showings
            .read()
            .values()
            .filter(|s| s.room_id == room_id && s.blocks_interval())
            .map(|s| (s.start_time, s.end_time))
            .collect();
        let duration = movie_duration_minutes * 60_000 + self.config.cleaning_buffer_millis();

        Ok(AvailableSlots::new(
            window_start,
            window_end,
            self.config.slot_step_millis(),
            duration,
            busy,
        ))
    }

    // ========================================================================
    // Reservation Lifecycle
    // ========================================================================

    /// Create a pending reservation with an atomic seat claim
    pub fn create_reservation(
        &self,
        input: CreateReservation,
        meta: &RequestMetadata,
    ) -> ManagerResult<ReservationSnapshot> {
        let now = meta.timestamp;

        // 1. Validate the seat list
        if input.seats.is_empty() {
            return Err(ManagerError::InvalidRequest(
                "no seats requested".to_string(),
            ));
        }
        if input.seats.len() > money::MAX_SEATS_PER_RESERVATION {
            return Err(ManagerError::InvalidRequest(format!(
                "at most {} seats per reservation, got {}",
                money::MAX_SEATS_PER_RESERVATION,
                input.seats.len()
            )));
        }
        let mut seen = HashSet::new();
        let duplicates: Vec<&str> = input
            .seats
            .iter()
            .filter(|s| !seen.insert(s.as_str()))
            .map(|s| s.as_str())
            .collect();
        if !duplicates.is_empty() {
            return Err(ManagerError::InvalidRequest(format!(
                "duplicate seats in request: {}",
                duplicates.join(", ")
            )));
        }
        for line in &input.items {
            money::validate_concession_line(line)?;
        }

        // 2. Validate the showing is scheduled and in the future
        let showing = self
            .get_showing(input.showing_id)
            .ok_or_else(|| {
                ManagerError::InvalidRequest(format!("showing {} not found", input.showing_id))
            })?;
        if showing.status != ShowingStatus::Scheduled {
            return Err(ManagerError::ShowingUnavailable(format!(
                "showing {} is {:?}",
                showing.id, showing.status
            )));
        }
        if showing.start_time <= now {
            return Err(ManagerError::ShowingUnavailable(format!(
                "showing {} has already started",
                showing.id
            )));
        }

        // 3. Resolve seats against the room layout
        let room = self.catalog.get_room(showing.room_id).ok_or_else(|| {
            ManagerError::Internal(format!("room {} missing from catalog", showing.room_id))
        })?;
        let mut seat_lines = Vec::with_capacity(input.seats.len());
        for code in &input.seats {
            let seat = room.seat(code).ok_or_else(|| {
                ManagerError::InvalidRequest(format!(
                    "unknown seat {} in room {}",
                    code, showing.room_id
                ))
            })?;
            if seat.out_of_service {
                return Err(ManagerError::InvalidRequest(format!(
                    "seat {} is out of service",
                    code
                )));
            }
            let price = showing
                .seat_prices
                .get(&seat.seat_type)
                .copied()
                .ok_or_else(|| {
                    ManagerError::InvalidRequest(format!(
                        "no price configured for seat type {:?}",
                        seat.seat_type
                    ))
                })?;
            seat_lines.push(SeatLine {
                seat_code: code.clone(),
                seat_type: seat.seat_type,
                price,
            });
        }

        // 4. Resolve concession lines with frozen prices
        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            let concession = self.catalog.get_concession(line.concession_id).ok_or_else(|| {
                ManagerError::InvalidRequest(format!(
                    "unknown concession {}",
                    line.concession_id
                ))
            })?;
            if !concession.is_active {
                return Err(ManagerError::InvalidRequest(format!(
                    "concession {} is not available",
                    concession.id
                )));
            }
            money::validate_price(concession.price, "concession price")?;
            items.push(engine::concession_line(
                concession.id,
                concession.name,
                concession.price,
                line.quantity,
            ));
        }

        // 5. Validate the promotion against the pre-discount amount
        let plan = match &input.promotion_code {
            Some(code) => {
                let normalized = Promotion::normalize_code(code);
                let promo = self
                    .promotions
                    .read()
                    .get(&normalized)
                    .cloned()
                    .ok_or(PromotionRejection::NotFound(normalized.clone()))?;
                let facts = self.showing_facts(&showing);
                let stats = self.customer_stats(input.customer_id, &normalized, now);
                let pre_discount: Decimal = seat_lines
                    .iter()
                    .map(|l| money::to_decimal(l.price))
                    .chain(items.iter().map(|l| money::to_decimal(l.line_total)))
                    .sum();
                Some(promotion::validate(
                    &promo,
                    &stats,
                    pre_discount,
                    &facts,
                    now,
                )?)
            }
            None => None,
        };

        // 6. Compute the price snapshot (frozen from here on)
        let quote = engine::compute_quote(&seat_lines, &items, plan.as_ref());

        let snapshot = ReservationSnapshot {
            reservation_id: uuid::Uuid::new_v4().to_string(),
            showing_id: input.showing_id,
            customer_id: input.customer_id,
            seats: input.seats.clone(),
            items,
            promotion: quote.promotion,
            subtotal: quote.subtotal,
            discount: quote.discount,
            total: quote.total,
            status: ReservationStatus::Pending,
            payment_status: PaymentStatus::Pending,
            hold_expires_at: now + self.config.hold_duration_millis(),
            promotion_committed: false,
            cancellation: None,
            created_at: now,
            updated_at: now,
        };

        // 7. Atomic region: check-and-claim all seats under the
        //    per-showing lock. Either every seat is claimed or none.
        {
            let lock = self.seat_lock(input.showing_id);
            let _guard = lock.lock();
            let mut store = self.state.write();
            let requested: HashSet<&str> = input.seats.iter().map(|s| s.as_str()).collect();
            let mut conflicts: Vec<String> = store
                .for_showing(input.showing_id)
                .filter(|r| r.holds_seats(now))
                .flat_map(|r| r.seats.iter())
                .filter(|seat| requested.contains(seat.as_str()))
                .cloned()
                .collect();
            if !conflicts.is_empty() {
                conflicts.sort();
                conflicts.dedup();
                tracing::debug!(
                    showing_id = input.showing_id,
                    conflicts = ?conflicts,
                    "Seat claim rejected"
                );
                return Err(ManagerError::SeatConflict { seats: conflicts });
            }
            store.insert(snapshot.clone());
        }

        // 8. Synchronous occupancy recompute + events
        self.recompute_occupancy(input.showing_id, now);
        self.emit(now, EventPayload::ReservationStateChanged {
            reservation_id: snapshot.reservation_id.clone(),
            showing_id: snapshot.showing_id,
            old_status: None,
            new_status: ReservationStatus::Pending,
        });

        tracing::info!(
            reservation_id = %snapshot.reservation_id,
            showing_id = snapshot.showing_id,
            customer_id = snapshot.customer_id,
            seats = ?snapshot.seats,
            total = snapshot.total,
            "Reservation created"
        );
        Ok(snapshot)
    }

    /// Apply a payment-success or payment-failure outcome
    ///
    /// Only valid from `Pending` and only while the hold is alive. A
    /// success commits the promotion usage (exactly once, inside the
    /// per-promotion atomic region) and confirms the reservation; a
    /// failure records it and leaves the hold in place for a retry.
    pub fn confirm_reservation(
        &self,
        reservation_id: &str,
        outcome: &PaymentOutcome,
        meta: &RequestMetadata,
    ) -> ManagerResult<ReservationSnapshot> {
        let now = meta.timestamp;
        if outcome.status == PaymentOutcomeStatus::Refunded {
            return Err(ManagerError::InvalidRequest(
                "refund outcomes are handled by acknowledge_refund".to_string(),
            ));
        }

        let mut store = self.state.write();
        let reservation = store
            .get_mut(reservation_id)
            .ok_or_else(|| ManagerError::ReservationNotFound(reservation_id.to_string()))?;

        // 1. Status gate
        match reservation.status {
            ReservationStatus::Pending => {}
            ReservationStatus::Confirmed
            | ReservationStatus::Cancelled
            | ReservationStatus::Refunded => {
                return Err(ManagerError::AlreadyFinal(format!(
                    "reservation {} is {:?}",
                    reservation_id, reservation.status
                )));
            }
        }

        // 2. Hold expiry, enforced at the point of use: expire in place
        //    and surface HoldExpired so the caller restarts the booking
        if now >= reservation.hold_expires_at {
            reservation.status = ReservationStatus::Cancelled;
            reservation.cancellation = Some(CancellationRecord {
                actor_id: meta.actor_id,
                actor_name: meta.actor_name.clone(),
                reason: "hold expired".to_string(),
                timestamp: now,
            });
            reservation.updated_at = now;
            let showing_id = reservation.showing_id;
            drop(store);
            self.recompute_occupancy(showing_id, now);
            self.emit(now, EventPayload::ReservationStateChanged {
                reservation_id: reservation_id.to_string(),
                showing_id,
                old_status: Some(ReservationStatus::Pending),
                new_status: ReservationStatus::Cancelled,
            });
            tracing::info!(reservation_id, "Confirm rejected: hold expired");
            return Err(ManagerError::HoldExpired(reservation_id.to_string()));
        }

        // 3. Payment failure: record it, keep the hold alive
        if outcome.status == PaymentOutcomeStatus::Failed {
            reservation.payment_status = PaymentStatus::Failed;
            reservation.updated_at = now;
            let snapshot = reservation.clone();
            tracing::warn!(reservation_id, "Payment failed, hold kept until expiry");
            return Ok(snapshot);
        }

        // 4. Amount must match the frozen snapshot
        if !money::amounts_equal(outcome.amount, reservation.total) {
            return Err(ManagerError::InvalidRequest(format!(
                "payment amount {:.2} does not match reservation total {:.2}",
                outcome.amount, reservation.total
            )));
        }

        // 5. Commit promotion usage exactly once, atomic with the cap
        //    check: two concurrent confirmations cannot both take the
        //    last remaining use
        let mut used_code = None;
        if let Some(applied) = reservation.promotion.clone()
            && !reservation.promotion_committed
        {
            let lock = self.promo_lock(&applied.code);
            let _guard = lock.lock();
            let mut promotions = self.promotions.write();
            match promotions.get_mut(&applied.code) {
                Some(promo) => {
                    if promo.remaining_uses() == Some(0) {
                        tracing::info!(
                            reservation_id,
                            code = %applied.code,
                            "Confirm rejected: promotion exhausted"
                        );
                        return Err(PromotionRejection::Exhausted(applied.code.clone()).into());
                    }
                    promo.current_uses += 1;
                    reservation.promotion_committed = true;
                    used_code = Some(applied.code.clone());
                }
                None => {
                    // Registry lost the code after validation; the
                    // frozen snapshot still stands
                    tracing::warn!(
                        reservation_id,
                        code = %applied.code,
                        "Promotion missing at confirm, skipping usage increment"
                    );
                    reservation.promotion_committed = true;
                }
            }
        }

        // 6. Transition
        reservation.status = ReservationStatus::Confirmed;
        reservation.payment_status = PaymentStatus::Completed;
        reservation.updated_at = now;
        let snapshot = reservation.clone();
        let showing_id = reservation.showing_id;
        drop(store);

        self.recompute_occupancy(showing_id, now);
        self.emit(now, EventPayload::ReservationStateChanged {
            reservation_id: reservation_id.to_string(),
            showing_id,
            old_status: Some(ReservationStatus::Pending),
            new_status: ReservationStatus::Confirmed,
        });
        if let Some(code) = used_code {
            self.emit(now, EventPayload::PromotionUsed {
                code,
                reservation_id: reservation_id.to_string(),
            });
        }

        tracing::info!(reservation_id, total = snapshot.total, "Reservation confirmed");
        Ok(snapshot)
    }

    /// Cancel a reservation manually (customer or staff)
    ///
    /// Allowed from `Pending` or `Confirmed`. Frees all seats
    /// synchronously and totally. A confirmed cancel leaves the payment
    /// status for the external refund flow to drive to `Refunded`.
    pub fn cancel_reservation(
        &self,
        reservation_id: &str,
        reason: impl Into<String>,
        meta: &RequestMetadata,
    ) -> ManagerResult<ReservationSnapshot> {
        let now = meta.timestamp;

        let mut store = self.state.write();
        let reservation = store
            .get_mut(reservation_id)
            .ok_or_else(|| ManagerError::ReservationNotFound(reservation_id.to_string()))?;

        let old_status = reservation.status;
        if old_status.is_final() {
            return Err(ManagerError::AlreadyFinal(format!(
                "reservation {} is {:?}",
                reservation_id, old_status
            )));
        }

        reservation.status = ReservationStatus::Cancelled;
        reservation.cancellation = Some(CancellationRecord {
            actor_id: meta.actor_id,
            actor_name: meta.actor_name.clone(),
            reason: reason.into(),
            timestamp: now,
        });
        reservation.updated_at = now;
        let snapshot = reservation.clone();
        let showing_id = reservation.showing_id;
        drop(store);

        self.recompute_occupancy(showing_id, now);
        self.emit(now, EventPayload::ReservationStateChanged {
            reservation_id: reservation_id.to_string(),
            showing_id,
            old_status: Some(old_status),
            new_status: ReservationStatus::Cancelled,
        });

        tracing::info!(
            reservation_id,
            actor_id = meta.actor_id,
            "Reservation cancelled"
        );
        Ok(snapshot)
    }

    /// Acknowledge a successful refund from the payment collaborator
    ///
    /// Valid from `Confirmed`, or from `Cancelled` after a completed
    /// payment. Terminal: nothing leaves `Refunded`.
    pub fn acknowledge_refund(
        &self,
        reservation_id: &str,
        outcome: &PaymentOutcome,
        meta: &RequestMetadata,
    ) -> ManagerResult<ReservationSnapshot> {
        let now = meta.timestamp;
        if outcome.status != PaymentOutcomeStatus::Refunded {
            return Err(ManagerError::InvalidRequest(format!(
                "expected a refunded outcome, got {:?}",
                outcome.status
            )));
        }

        let mut store = self.state.write();
        let reservation = store
            .get_mut(reservation_id)
            .ok_or_else(|| ManagerError::ReservationNotFound(reservation_id.to_string()))?;

        let old_status = reservation.status;
        match old_status {
            ReservationStatus::Refunded => {
                return Err(ManagerError::AlreadyFinal(format!(
                    "reservation {} is already refunded",
                    reservation_id
                )));
            }
            ReservationStatus::Pending => {
                return Err(ManagerError::InvalidRequest(format!(
                    "reservation {} has no payment to refund",
                    reservation_id
                )));
            }
            ReservationStatus::Confirmed => {}
            ReservationStatus::Cancelled => {
                if reservation.payment_status != PaymentStatus::Completed {
                    return Err(ManagerError::InvalidRequest(format!(
                        "reservation {} has no completed payment to refund",
                        reservation_id
                    )));
                }
            }
        }

        reservation.status = ReservationStatus::Refunded;
        reservation.payment_status = PaymentStatus::Refunded;
        reservation.updated_at = now;
        let snapshot = reservation.clone();
        let showing_id = reservation.showing_id;
        drop(store);

        self.recompute_occupancy(showing_id, now);
        self.emit(now, EventPayload::ReservationStateChanged {
            reservation_id: reservation_id.to_string(),
            showing_id,
            old_status: Some(old_status),
            new_status: ReservationStatus::Refunded,
        });

        tracing::info!(reservation_id, "Refund acknowledged");
        Ok(snapshot)
    }

    /// Route an inbound payment outcome to the matching transition
    pub fn apply_payment_outcome(
        &self,
        outcome: &PaymentOutcome,
        meta: &RequestMetadata,
    ) -> ManagerResult<ReservationSnapshot> {
        match outcome.status {
            PaymentOutcomeStatus::Success | PaymentOutcomeStatus::Failed => {
                self.confirm_reservation(&outcome.reservation_id, outcome, meta)
            }
            PaymentOutcomeStatus::Refunded => {
                self.acknowledge_refund(&outcome.reservation_id, outcome, meta)
            }
        }
    }

    // ========================================================================
    // Hold Expiry
    // ========================================================================

    /// Physically reclaim expired holds
    ///
    /// Correctness never depends on this: every conflict and validity
    /// check treats an expired pending reservation as released. The
    /// sweep transitions them to `Cancelled` so seats and occupancy
    /// reflect reality without waiting for the next conflicting
    /// request. Returns the number of reclaimed holds.
    pub fn sweep_expired(&self, now: i64) -> usize {
        let expired: Vec<String> = {
            let store = self.state.read();
            store
                .values()
                .filter(|r| r.status == ReservationStatus::Pending && now >= r.hold_expires_at)
                .map(|r| r.reservation_id.clone())
                .collect()
        };
        if expired.is_empty() {
            return 0;
        }

        let mut touched_showings: Vec<i64> = Vec::new();
        let mut reclaimed = 0;
        for reservation_id in expired {
            let showing_id = {
                let mut store = self.state.write();
                let Some(reservation) = store.get_mut(&reservation_id) else {
                    continue;
                };
                // Re-check under the write lock; a confirm may have
                // won the race meanwhile
                if reservation.status != ReservationStatus::Pending
                    || now < reservation.hold_expires_at
                {
                    continue;
                }
                reservation.status = ReservationStatus::Cancelled;
                reservation.cancellation = Some(CancellationRecord {
                    actor_id: 0,
                    actor_name: "system".to_string(),
                    reason: "hold expired".to_string(),
                    timestamp: now,
                });
                reservation.updated_at = now;
                reservation.showing_id
            };

            self.emit(now, EventPayload::ReservationStateChanged {
                reservation_id: reservation_id.clone(),
                showing_id,
                old_status: Some(ReservationStatus::Pending),
                new_status: ReservationStatus::Cancelled,
            });
            if !touched_showings.contains(&showing_id) {
                touched_showings.push(showing_id);
            }
            reclaimed += 1;
        }

        for showing_id in touched_showings {
            self.recompute_occupancy(showing_id, now);
        }
        if reclaimed > 0 {
            tracing::info!(reclaimed, "Expired holds reclaimed");
        }
        reclaimed
    }

    // ========================================================================
    // Promotions Registry
    // ========================================================================

    /// Register or replace a promotion (code is normalized)
    pub fn upsert_promotion(&self, mut promotion: Promotion) {
        promotion.code = Promotion::normalize_code(&promotion.code);
        self.promotions
            .write()
            .insert(promotion.code.clone(), promotion);
    }

    /// Look up a promotion by code (case-insensitive)
    pub fn get_promotion(&self, code: &str) -> Option<Promotion> {
        self.promotions
            .read()
            .get(&Promotion::normalize_code(code))
            .cloned()
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Get a showing by id
    pub fn get_showing(&self, showing_id: i64) -> Option<Showing> {
        self.showings.read().get(&showing_id).cloned()
    }

    /// Get a reservation snapshot by id
    pub fn get_reservation(&self, reservation_id: &str) -> Option<ReservationSnapshot> {
        self.state.read().get(reservation_id).cloned()
    }

    /// All reservations against a showing (any status)
    pub fn reservations_for_showing(&self, showing_id: i64) -> Vec<ReservationSnapshot> {
        self.state
            .read()
            .for_showing(showing_id)
            .cloned()
            .collect()
    }

    /// Current occupancy for a showing
    pub fn get_occupancy(&self, showing_id: i64) -> ManagerResult<OccupancySummary> {
        let now = shared::util::now_millis();
        let showing = self
            .get_showing(showing_id)
            .ok_or(SlotError::ShowingNotFound(showing_id))?;
        let capacity = self.catalog.room_capacity(showing.room_id).ok_or_else(|| {
            ManagerError::Internal(format!("room {} missing from catalog", showing.room_id))
        })?;
        let store = self.state.read();
        Ok(occupancy::recompute(
            showing_id,
            capacity,
            store.for_showing(showing_id),
            now,
        ))
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn seat_lock(&self, showing_id: i64) -> Arc<Mutex<()>> {
        self.seat_locks.entry(showing_id).or_default().clone()
    }

    fn room_lock(&self, room_id: i64) -> Arc<Mutex<()>> {
        self.room_locks.entry(room_id).or_default().clone()
    }

    fn promo_lock(&self, code: &str) -> Arc<Mutex<()>> {
        self.promo_locks.entry(code.to_string()).or_default().clone()
    }

    /// Facts for promotion applicability checks
    fn showing_facts(&self, showing: &Showing) -> ShowingFacts {
        let genres = self
            .catalog
            .get_movie(showing.movie_id)
            .map(|m| m.genres)
            .unwrap_or_default();
        ShowingFacts {
            showing_id: showing.id,
            movie_id: showing.movie_id,
            genres,
        }
    }

    /// Facts for promotion eligibility checks, computed from the store
    fn customer_stats(&self, customer_id: i64, code: &str, now: i64) -> CustomerStats {
        let store = self.state.read();
        let mut prior_paid_reservations = 0;
        let mut prior_uses_of_code = 0;
        for r in store.values().filter(|r| r.customer_id == customer_id) {
            if matches!(
                r.payment_status,
                PaymentStatus::Completed | PaymentStatus::Refunded
            ) {
                prior_paid_reservations += 1;
            }
            let carries_code = r
                .promotion
                .as_ref()
                .is_some_and(|p| p.code == code);
            let active = match r.status {
                ReservationStatus::Pending => r.holds_seats(now),
                ReservationStatus::Confirmed => true,
                ReservationStatus::Cancelled | ReservationStatus::Refunded => false,
            };
            if carries_code && active {
                prior_uses_of_code += 1;
            }
        }
        CustomerStats {
            prior_paid_reservations,
            prior_uses_of_code,
        }
    }

    /// Recompute derived occupancy for a showing and broadcast it
    ///
    /// Runs synchronously as part of the mutation that changed
    /// occupancy; callers invoke it with no locks held.
    fn recompute_occupancy(&self, showing_id: i64, now: i64) {
        let Some(showing) = self.get_showing(showing_id) else {
            return;
        };
        let Some(capacity) = self.catalog.room_capacity(showing.room_id) else {
            tracing::error!(
                showing_id,
                room_id = showing.room_id,
                "Room missing from catalog, skipping occupancy recompute"
            );
            return;
        };

        let summary = {
            let store = self.state.read();
            occupancy::recompute(showing_id, capacity, store.for_showing(showing_id), now)
        };

        {
            let mut showings = self.showings.write();
            if let Some(s) = showings.get_mut(&showing_id) {
                s.is_full = summary.is_full;
                s.updated_at = now;
            }
        }

        self.emit(now, EventPayload::OccupancyChanged {
            showing_id,
            booked_seats: summary.booked_seats,
            capacity: summary.capacity,
            is_full: summary.is_full,
        });
    }

    /// Broadcast an event; fire-and-forget
    fn emit(&self, timestamp: i64, payload: EventPayload) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let event = BookingEvent::new(sequence, timestamp, payload);
        if self.event_tx.send(event).is_err() {
            tracing::debug!("Event broadcast skipped: no active receivers");
        }
    }

    /// Resolve a local date+time to Unix millis in the business tz
    fn local_millis(&self, date: NaiveDate, time: NaiveTime) -> ManagerResult<i64> {
        let naive = date.and_time(time);
        naive
            .and_local_timezone(self.config.tz)
            .single()
            .or_else(|| {
                // DST edge case: take the later of two candidates
                naive.and_local_timezone(self.config.tz).latest()
            })
            .map(|dt| dt.timestamp_millis())
            .ok_or_else(|| {
                SlotError::InvalidInterval(format!("cannot resolve local time {} {}", date, time))
                    .into()
            })
    }
}

#[cfg(test)]
mod tests;
