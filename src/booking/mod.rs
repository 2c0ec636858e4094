//! Seat selection and booking state.
//!
//! Everything in here is synchronous and free of I/O. Collaborators such as
//! the catalog or the payment callback feed values in through method
//! arguments.

pub mod seat_map;
pub mod selection;
pub mod pricing;
pub mod session;
pub mod finalizer;

pub use finalizer::PaymentConfirmation;
pub use pricing::Quote;
pub use seat_map::{FixedOccupancy, Occupancy, RandomOccupancy, SeatMap, SeatMapGenerator, SeatPricing};
pub use selection::{Notice, SelectOutcome, Selection, TargetCount};
pub use session::{BookingSession, PaymentRequest, WizardStep};

use thiserror::Error;

/// A booking step was attempted without what it depends on.
/// Callers should route the user back to an earlier step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("No {0} selected")]
    MissingContext(&'static str),
    #[error("Showtime {showtime} is not playing this movie at the selected theatre")]
    ShowtimeMismatch { showtime: String },
    #[error("Seat map belongs to showtime {actual}, expected {expected}")]
    SeatMapMismatch { expected: String, actual: String },
    #[error("Please select {target} seat(s)")]
    IncompleteSelection { selected: usize, target: usize },
    #[error("This theatre is in demo mode only")]
    PaymentUnavailable,
    #[error("Payment has not been started for this booking")]
    PaymentNotStarted,
    #[error("Paid amount {received} does not match the order total {expected}")]
    AmountMismatch { expected: i64, received: i64 },
    #[error("This session already holds a completed booking")]
    AlreadyBooked,
}
