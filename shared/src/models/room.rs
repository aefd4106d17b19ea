//! Room and Seat Models

use serde::{Deserialize, Serialize};

/// Seat type, priced per showing via the showing's price table
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatType {
    Standard,
    Vip,
}

/// Physical seat within a room
///
/// `code` encodes row + column, e.g. "A1", "B12".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seat {
    pub code: String,
    pub seat_type: SeatType,
    /// Seat is blocked for maintenance and cannot be reserved
    #[serde(default)]
    pub out_of_service: bool,
}

impl Seat {
    pub fn new(code: impl Into<String>, seat_type: SeatType) -> Self {
        Self {
            code: code.into(),
            seat_type,
            out_of_service: false,
        }
    }
}

/// Room entity with its static seat layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub name: String,
    pub seats: Vec<Seat>,
    pub is_active: bool,
}

impl Room {
    /// Bookable capacity (seats not under maintenance)
    pub fn capacity(&self) -> usize {
        self.seats.iter().filter(|s| !s.out_of_service).count()
    }

    /// Look up a seat by code
    pub fn seat(&self, code: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.code == code)
    }
}

/// Create room payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCreate {
    pub name: String,
    pub seats: Vec<Seat>,
}

/// Update room payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomUpdate {
    pub name: Option<String>,
    pub seats: Option<Vec<Seat>>,
    pub is_active: Option<bool>,
}
