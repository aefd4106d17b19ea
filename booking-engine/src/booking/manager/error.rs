use crate::booking::slots::SlotError;
use crate::pricing::promotion::PromotionRejection;
use shared::booking::{BookingErrorCode, CommandError};
use thiserror::Error;

/// Manager errors
#[derive(Debug, Clone, Error)]
pub enum ManagerError {
    /// One or more requested seats are already held; carries every
    /// contested seat so the caller can re-query availability
    #[error("Seats already held: {}", seats.join(", "))]
    SeatConflict { seats: Vec<String> },

    #[error("Showing unavailable: {0}")]
    ShowingUnavailable(String),

    #[error(transparent)]
    PromotionRejected(#[from] PromotionRejection),

    #[error("Hold expired for reservation {0}")]
    HoldExpired(String),

    #[error("Reservation already finalized: {0}")]
    AlreadyFinal(String),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Slot(#[from] SlotError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ManagerError> for CommandError {
    fn from(err: ManagerError) -> Self {
        let (code, message) = match &err {
            ManagerError::SeatConflict { .. } => (BookingErrorCode::SeatConflict, err.to_string()),
            ManagerError::ShowingUnavailable(_) => {
                (BookingErrorCode::ShowingUnavailable, err.to_string())
            }
            ManagerError::PromotionRejected(_) => {
                (BookingErrorCode::PromotionRejected, err.to_string())
            }
            ManagerError::HoldExpired(_) => (BookingErrorCode::HoldExpired, err.to_string()),
            ManagerError::AlreadyFinal(_) => (BookingErrorCode::AlreadyFinal, err.to_string()),
            ManagerError::ReservationNotFound(_) => {
                (BookingErrorCode::ReservationNotFound, err.to_string())
            }
            ManagerError::InvalidRequest(_) => (BookingErrorCode::InvalidRequest, err.to_string()),
            ManagerError::Slot(slot) => {
                let code = match slot {
                    SlotError::RoomConflict { .. } => BookingErrorCode::RoomConflict,
                    SlotError::RoomNotFound(_)
                    | SlotError::MovieNotFound(_)
                    | SlotError::ShowingNotFound(_)
                    | SlotError::InvalidInterval(_) => BookingErrorCode::InvalidRequest,
                };
                (code, err.to_string())
            }
            ManagerError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal manager error");
                (BookingErrorCode::InternalError, err.to_string())
            }
        };
        CommandError::new(code, message)
    }
}

pub type ManagerResult<T> = Result<T, ManagerError>;
