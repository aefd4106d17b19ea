use super::*;
use crate::booking::RequestMetadata;
use shared::booking::{BookingEventType, ConcessionLineInput};
use shared::models::{Concession, DiscountType, Movie, Room, Seat, SeatType};

mod test_core;

/// Fixed base instant for deterministic clocks (2030-03-17, far enough
/// in the future that wall-clock reads never see holds as expired)
const BASE: i64 = 1_900_000_000_000;
const MINUTE: i64 = 60_000;
const HOUR: i64 = 60 * MINUTE;

// ========================================================================
// Harness
// ========================================================================

/// Opt-in log output for debugging test runs
/// (`RUST_LOG=booking_engine=debug cargo test`)
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn test_catalog() -> Arc<CatalogService> {
    let catalog = CatalogService::new();

    let mut maintenance_seat = Seat::new("C1", SeatType::Standard);
    maintenance_seat.out_of_service = true;
    catalog.upsert_room(Room {
        id: 1,
        name: "Sala 1".to_string(),
        seats: vec![
            Seat::new("A1", SeatType::Vip),
            Seat::new("A2", SeatType::Vip),
            Seat::new("B3", SeatType::Standard),
            Seat::new("B4", SeatType::Standard),
            maintenance_seat,
        ],
        is_active: true,
    });
    catalog.upsert_room(Room {
        id: 2,
        name: "Sala 2".to_string(),
        seats: vec![
            Seat::new("A1", SeatType::Standard),
            Seat::new("A2", SeatType::Standard),
        ],
        is_active: true,
    });

    catalog.upsert_movie(Movie {
        id: 1,
        title: "Test Feature".to_string(),
        duration_minutes: 90,
        genres: vec!["action".to_string()],
        is_active: true,
    });
    // 105 min runtime + 15 min cleaning buffer = a 2h room interval
    catalog.upsert_movie(Movie {
        id: 3,
        title: "Two Hour Block".to_string(),
        duration_minutes: 105,
        genres: vec!["drama".to_string()],
        is_active: true,
    });

    catalog.upsert_concession(Concession {
        id: 1,
        name: "Popcorn Combo".to_string(),
        price: 50_000.0,
        is_active: true,
    });
    catalog.upsert_concession(Concession {
        id: 2,
        name: "Soda".to_string(),
        price: 25_000.0,
        is_active: true,
    });
    catalog.upsert_concession(Concession {
        id: 3,
        name: "Retired Combo".to_string(),
        price: 10_000.0,
        is_active: false,
    });

    Arc::new(catalog)
}

fn test_manager() -> Arc<BookingManager> {
    Arc::new(BookingManager::new(test_catalog(), EngineConfig::default()))
}

fn meta_at(timestamp: i64) -> RequestMetadata {
    RequestMetadata::at(1, "Test Operator", timestamp)
}

/// Standard price table: VIP 120000, standard 90000
fn price_table() -> HashMap<SeatType, f64> {
    HashMap::from([(SeatType::Vip, 120_000.0), (SeatType::Standard, 90_000.0)])
}

/// Schedule a showing of movie 1 in room 1, one day after BASE
fn schedule_showing(manager: &BookingManager) -> Showing {
    schedule_showing_at(manager, 1, 1, BASE + 24 * HOUR)
}

fn schedule_showing_at(
    manager: &BookingManager,
    movie_id: i64,
    room_id: i64,
    start_time: i64,
) -> Showing {
    manager
        .create_showing(
            ShowingCreate {
                movie_id,
                room_id,
                start_time,
                seat_prices: price_table(),
            },
            &meta_at(BASE),
        )
        .expect("failed to schedule showing")
}

fn reservation_input(showing_id: i64, seats: &[&str]) -> CreateReservation {
    CreateReservation {
        showing_id,
        customer_id: 100,
        seats: seats.iter().map(|s| s.to_string()).collect(),
        items: vec![],
        promotion_code: None,
    }
}

/// Reference booking: seats [A1 vip, B3 standard] + popcorn combo x2
fn scenario_input(showing_id: i64, promotion_code: Option<&str>) -> CreateReservation {
    CreateReservation {
        showing_id,
        customer_id: 100,
        seats: vec!["A1".to_string(), "B3".to_string()],
        items: vec![ConcessionLineInput {
            concession_id: 1,
            quantity: 2,
        }],
        promotion_code: promotion_code.map(|c| c.to_string()),
    }
}

fn make_promotion(code: &str, discount_type: DiscountType, value: f64) -> Promotion {
    Promotion {
        id: shared::util::snowflake_id(),
        code: code.to_string(),
        name: code.to_string(),
        description: None,
        discount_type,
        value,
        max_discount: None,
        valid_from: BASE - 24 * HOUR,
        valid_until: BASE + 30 * 24 * HOUR,
        max_uses: None,
        current_uses: 0,
        min_order_amount: None,
        showing_ids: vec![],
        movie_ids: vec![],
        genres: vec![],
        first_time_only: false,
        min_prior_orders: None,
        one_use_per_customer: false,
        is_active: true,
        created_at: BASE - 24 * HOUR,
    }
}

/// SUMMER10: percent 10, capped at 25000
fn summer10() -> Promotion {
    let mut promo = make_promotion("SUMMER10", DiscountType::Percent, 10.0);
    promo.max_discount = Some(25_000.0);
    promo
}

fn success_outcome(reservation_id: &str, amount: f64) -> PaymentOutcome {
    PaymentOutcome {
        reservation_id: reservation_id.to_string(),
        status: PaymentOutcomeStatus::Success,
        amount,
        method: "CARD".to_string(),
    }
}

fn failed_outcome(reservation_id: &str, amount: f64) -> PaymentOutcome {
    PaymentOutcome {
        reservation_id: reservation_id.to_string(),
        status: PaymentOutcomeStatus::Failed,
        amount,
        method: "CARD".to_string(),
    }
}

fn refunded_outcome(reservation_id: &str, amount: f64) -> PaymentOutcome {
    PaymentOutcome {
        reservation_id: reservation_id.to_string(),
        status: PaymentOutcomeStatus::Refunded,
        amount,
        method: "CARD".to_string(),
    }
}

/// Drain every event currently buffered in a subscription
fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<BookingEvent>) -> Vec<BookingEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
