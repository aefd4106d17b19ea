//! Reservation creation, validation and pricing snapshots

use super::*;

#[test]
fn test_create_reservation_computes_price_snapshot() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    let reservation = manager
        .create_reservation(scenario_input(showing.id, None), &meta_at(BASE))
        .unwrap();

    // 120000 (A1 vip) + 90000 (B3 standard) + 2 x 50000 = 310000
    assert_eq!(reservation.subtotal, 310_000.0);
    assert_eq!(reservation.discount, 0.0);
    assert_eq!(reservation.total, 310_000.0);
    assert!(reservation.promotion.is_none());
    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(reservation.payment_status, PaymentStatus::Pending);
    assert_eq!(reservation.hold_expires_at, BASE + 10 * MINUTE);
    assert_eq!(reservation.seats, vec!["A1".to_string(), "B3".to_string()]);
    assert_eq!(reservation.items.len(), 1);
    assert_eq!(reservation.items[0].line_total, 100_000.0);
}

#[test]
fn test_create_reservation_with_capped_promotion() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);
    manager.upsert_promotion(summer10());

    let reservation = manager
        .create_reservation(scenario_input(showing.id, Some("SUMMER10")), &meta_at(BASE))
        .unwrap();

    // min(310000 * 10%, 25000) = 25000
    assert_eq!(reservation.subtotal, 310_000.0);
    assert_eq!(reservation.discount, 25_000.0);
    assert_eq!(reservation.total, 285_000.0);

    let applied = reservation.promotion.as_ref().unwrap();
    assert_eq!(applied.code, "SUMMER10");
    assert_eq!(applied.discount_amount, 25_000.0);
    assert!(!reservation.promotion_committed);
}

#[test]
fn test_total_equals_subtotal_minus_discount() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);
    manager.upsert_promotion(make_promotion("FLAT30K", DiscountType::Fixed, 30_000.0));

    let reservation = manager
        .create_reservation(scenario_input(showing.id, Some("FLAT30K")), &meta_at(BASE))
        .unwrap();

    assert_eq!(reservation.total, reservation.subtotal - reservation.discount);
    assert_eq!(reservation.discount, 30_000.0);
}

#[test]
fn test_empty_seat_list_rejected() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    let result = manager.create_reservation(reservation_input(showing.id, &[]), &meta_at(BASE));
    assert!(matches!(result, Err(ManagerError::InvalidRequest(_))));
}

#[test]
fn test_duplicate_seats_in_request_rejected() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    let result = manager.create_reservation(
        reservation_input(showing.id, &["A1", "B3", "A1"]),
        &meta_at(BASE),
    );
    assert!(matches!(
        result,
        Err(ManagerError::InvalidRequest(msg)) if msg.contains("duplicate") && msg.contains("A1")
    ));
}

#[test]
fn test_unknown_seat_rejected() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    let result =
        manager.create_reservation(reservation_input(showing.id, &["Z9"]), &meta_at(BASE));
    assert!(matches!(
        result,
        Err(ManagerError::InvalidRequest(msg)) if msg.contains("Z9")
    ));
}

#[test]
fn test_out_of_service_seat_rejected() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    let result =
        manager.create_reservation(reservation_input(showing.id, &["C1"]), &meta_at(BASE));
    assert!(matches!(
        result,
        Err(ManagerError::InvalidRequest(msg)) if msg.contains("out of service")
    ));
}

#[test]
fn test_unknown_showing_rejected() {
    let manager = test_manager();

    let result = manager.create_reservation(reservation_input(999, &["A1"]), &meta_at(BASE));
    assert!(matches!(
        result,
        Err(ManagerError::InvalidRequest(msg)) if msg.contains("not found")
    ));
}

#[test]
fn test_showing_already_started_rejected() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    // One millisecond after start
    let result = manager.create_reservation(
        reservation_input(showing.id, &["A1"]),
        &meta_at(showing.start_time + 1),
    );
    assert!(matches!(result, Err(ManagerError::ShowingUnavailable(_))));
}

#[test]
fn test_cancelled_showing_rejected() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);
    manager.cancel_showing(showing.id, &meta_at(BASE)).unwrap();

    let result =
        manager.create_reservation(reservation_input(showing.id, &["A1"]), &meta_at(BASE));
    assert!(matches!(result, Err(ManagerError::ShowingUnavailable(_))));
}

#[test]
fn test_unknown_concession_rejected() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    let mut input = reservation_input(showing.id, &["A1"]);
    input.items = vec![ConcessionLineInput {
        concession_id: 999,
        quantity: 1,
    }];
    let result = manager.create_reservation(input, &meta_at(BASE));
    assert!(matches!(result, Err(ManagerError::InvalidRequest(_))));
}

#[test]
fn test_inactive_concession_rejected() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    let mut input = reservation_input(showing.id, &["A1"]);
    input.items = vec![ConcessionLineInput {
        concession_id: 3,
        quantity: 1,
    }];
    let result = manager.create_reservation(input, &meta_at(BASE));
    assert!(matches!(
        result,
        Err(ManagerError::InvalidRequest(msg)) if msg.contains("not available")
    ));
}

#[test]
fn test_non_positive_concession_quantity_rejected() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    let mut input = reservation_input(showing.id, &["A1"]);
    input.items = vec![ConcessionLineInput {
        concession_id: 1,
        quantity: 0,
    }];
    let result = manager.create_reservation(input, &meta_at(BASE));
    assert!(matches!(result, Err(ManagerError::InvalidRequest(_))));
}

#[test]
fn test_seat_conflict_identifies_contested_seats() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    manager
        .create_reservation(reservation_input(showing.id, &["A1", "B3"]), &meta_at(BASE))
        .unwrap();

    let result = manager.create_reservation(
        reservation_input(showing.id, &["B3", "B4"]),
        &meta_at(BASE + MINUTE),
    );
    match result {
        Err(ManagerError::SeatConflict { seats }) => {
            assert_eq!(seats, vec!["B3".to_string()]);
        }
        other => panic!("Expected SeatConflict, got {:?}", other),
    }
}

#[test]
fn test_failed_claim_releases_nothing() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    manager
        .create_reservation(reservation_input(showing.id, &["A1"]), &meta_at(BASE))
        .unwrap();

    // [A1, B4] fails on A1; B4 must not be claimed as a side effect
    let conflict = manager.create_reservation(
        reservation_input(showing.id, &["A1", "B4"]),
        &meta_at(BASE + MINUTE),
    );
    assert!(matches!(conflict, Err(ManagerError::SeatConflict { .. })));

    let retry = manager.create_reservation(
        reservation_input(showing.id, &["B4"]),
        &meta_at(BASE + 2 * MINUTE),
    );
    assert!(retry.is_ok());
}

#[test]
fn test_same_seats_free_on_other_showing() {
    let manager = test_manager();
    let first = schedule_showing(&manager);
    let second = schedule_showing_at(&manager, 1, 1, BASE + 48 * HOUR);

    manager
        .create_reservation(reservation_input(first.id, &["A1"]), &meta_at(BASE))
        .unwrap();
    let result =
        manager.create_reservation(reservation_input(second.id, &["A1"]), &meta_at(BASE));
    assert!(result.is_ok());
}

#[test]
fn test_occupancy_after_create() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    manager
        .create_reservation(reservation_input(showing.id, &["A1", "B3"]), &meta_at(BASE))
        .unwrap();

    let occupancy = manager.get_occupancy(showing.id).unwrap();
    assert_eq!(occupancy.booked_seats, 2);
    assert_eq!(occupancy.capacity, 4);
    assert!(!occupancy.is_full);
}

#[test]
fn test_showing_marked_full_at_capacity() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);

    manager
        .create_reservation(
            reservation_input(showing.id, &["A1", "A2", "B3", "B4"]),
            &meta_at(BASE),
        )
        .unwrap();

    let occupancy = manager.get_occupancy(showing.id).unwrap();
    assert!(occupancy.is_full);
    assert!(manager.get_showing(showing.id).unwrap().is_full);
}

#[test]
fn test_events_emitted_on_create() {
    let manager = test_manager();
    let showing = schedule_showing(&manager);
    let mut rx = manager.subscribe();

    let reservation = manager
        .create_reservation(reservation_input(showing.id, &["A1"]), &meta_at(BASE))
        .unwrap();

    let events = drain_events(&mut rx);
    assert!(events
        .iter()
        .any(|e| e.event_type == BookingEventType::OccupancyChanged));
    assert!(events.iter().any(|e| matches!(
        &e.payload,
        EventPayload::ReservationStateChanged {
            reservation_id,
            old_status: None,
            new_status: ReservationStatus::Pending,
            ..
        } if *reservation_id == reservation.reservation_id
    )));

    // Sequence numbers are strictly increasing
    let sequences: Vec<u64> = events.iter().map(|e| e.sequence).collect();
    let mut sorted = sequences.clone();
    sorted.sort_unstable();
    assert_eq!(sequences, sorted);
}
