use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Movie, Seat, Showtime, Theatre};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

/// Immutable record of a paid reservation. Seats are a snapshot, not live references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub showtime_id: String,
    pub seats: Vec<Seat>,
    pub total_amount: i64,
    pub booking_date: DateTime<Utc>,
    pub payment_status: PaymentStatus,
}

impl Booking {
    pub fn seat_labels(&self) -> Vec<String> {
        self.seats.iter().map(Seat::label).collect()
    }
}

/// Everything the ticket display needs: the booking plus the context it was made in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub booking: Booking,
    pub theatre: Theatre,
    pub movie: Movie,
    pub showtime: Showtime,
}
