//! Data models
//!
//! Master data consumed by the booking engine. Rooms, movies and
//! concession items are owned by external management surfaces; the
//! engine reads them through the catalog. Promotions are listed here
//! too because their usage counters are mutated by the engine.
//! All IDs are `i64`.

pub mod concession;
pub mod movie;
pub mod promotion;
pub mod room;

// Re-exports
pub use concession::*;
pub use movie::*;
pub use promotion::*;
pub use room::*;
