//! Booking Engine - 影院预订一致性引擎
//!
//! # 架构概述
//!
//! This crate is the booking & reservation consistency core of the
//! cinema backend. It owns:
//!
//! - **预订管理** (`booking::manager`): reservation lifecycle state
//!   machine with race-free seat claims and hold expiry
//! - **档期分配** (`booking::slots`): non-overlapping room interval
//!   allocation for showings
//! - **定价** (`pricing`): deterministic price snapshots from seats,
//!   concessions and promotion codes
//! - **目录** (`catalog`): read-only master-data facade (rooms, movies,
//!   concession items)
//!
//! # 模块结构
//!
//! ```text
//! booking-engine/src/
//! ├── config.rs      # Engine configuration (hold duration, windows)
//! ├── catalog.rs     # Read-only master-data lookups
//! ├── booking/       # Reservation manager, slots, occupancy, reaper
//! └── pricing/       # Pricing engine, promotion validator, money
//! ```
//!
//! # Control Flow
//!
//! ```text
//! CreateReservation → BookingManager
//!        ├─ Slot/Showing validity (booking::slots)
//!        ├─ Price snapshot (pricing::engine → pricing::promotion)
//!        ├─ Atomic seat claim (per-showing lock)
//!        ├─ Hold timer (hold_expires_at)
//!        └─ Occupancy recompute + event broadcast
//! PaymentOutcome → BookingManager → confirm / fail / refund
//! ```

pub mod booking;
pub mod catalog;
pub mod config;
pub mod pricing;

// Re-exports
pub use booking::hold_reaper::HoldReaper;
pub use booking::manager::{BookingManager, ManagerError, ManagerResult};
pub use booking::RequestMetadata;
pub use catalog::CatalogService;
pub use config::EngineConfig;
