use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use super::{pricing, session::BookingSession, BookingError};
use crate::models::{Booking, PaymentStatus, Principal, Seat};

/// Success signal from the payment widget. `amount` is in minor units, as charged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentConfirmation {
    pub payment_id: String,
    pub amount: i64,
}

pub fn finalize(
    session: &BookingSession,
    user: &Principal,
    confirmation: &PaymentConfirmation,
) -> Result<Booking, BookingError> {
    finalize_at(session, user, confirmation, Utc::now())
}

/// Snapshots a complete session into a paid booking stamped with `now`.
pub fn finalize_at(
    session: &BookingSession,
    user: &Principal,
    confirmation: &PaymentConfirmation,
    now: DateTime<Utc>,
) -> Result<Booking, BookingError> {
    if session.booking().is_some() {
        return Err(BookingError::AlreadyBooked);
    }

    let (_, _, showtime, map) = session.context()?;
    let selection = session.selection();
    if !selection.is_complete() {
        return Err(BookingError::IncompleteSelection {
            selected: selection.len(),
            target: selection.target().get(),
        });
    }

    let total_amount = pricing::total(selection, map);
    let expected = pricing::minor_units(total_amount);
    if confirmation.amount != expected {
        return Err(BookingError::AmountMismatch {
            expected,
            received: confirmation.amount,
        });
    }

    let seats: Vec<Seat> = selection.seats(map).into_iter().cloned().collect();

    Ok(Booking {
        id: format!("booking-{}", Uuid::new_v4().simple()),
        user_id: user.id.clone(),
        showtime_id: showtime.id.clone(),
        seats,
        total_amount,
        booking_date: now,
        payment_status: PaymentStatus::Completed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::session::tests::{movie, showtime, theatre};
    use crate::booking::seat_map::{FixedOccupancy, SeatMapGenerator, SeatPricing};
    use crate::models::SeatId;
    use chrono::TimeZone;

    fn session_with_seats(target: u32, clicks: &[&str]) -> BookingSession {
        let mut generator = SeatMapGenerator::new(SeatPricing::default(), FixedOccupancy::none());
        let mut session = BookingSession::default();
        session.choose_theatre(theatre(true));
        session.choose_movie(movie()).unwrap();
        session.choose_showtime(showtime()).unwrap();
        session.enter_seat_selection(|id| generator.generate(id)).unwrap();
        session.set_target_count(target).unwrap();
        for label in clicks {
            session
                .select_seat(&SeatId::from(format!("showtime-1-{}", label)))
                .unwrap();
        }
        session
    }

    fn confirmation(amount: i64) -> PaymentConfirmation {
        PaymentConfirmation {
            payment_id: "pay_123".into(),
            amount,
        }
    }

    #[test]
    fn incomplete_selection_is_a_precondition_error() {
        let mut session = session_with_seats(2, &["C5"]);
        session.set_target_count(3).unwrap();
        session.select_seat(&SeatId::from("showtime-1-C5")).unwrap();
        session.deselect_seat(&SeatId::from("showtime-1-C7")).unwrap();
        assert_eq!(session.selection().len(), 2);

        let result = finalize(&session, &Principal::user("user-1", "a@b.c"), &confirmation(30_000));

        assert_eq!(
            result,
            Err(BookingError::IncompleteSelection { selected: 2, target: 3 })
        );
        assert!(session.booking().is_none());
    }

    #[test]
    fn missing_context_is_a_precondition_error() {
        let session = BookingSession::default();
        let result = finalize(&session, &Principal::user("u", "a@b.c"), &confirmation(0));
        assert_eq!(result, Err(BookingError::MissingContext("theatre")));
    }

    #[test]
    fn amount_must_match_the_order_total() {
        let session = session_with_seats(2, &["D1"]);
        let result = finalize(&session, &Principal::user("u", "a@b.c"), &confirmation(100));
        assert_eq!(
            result,
            Err(BookingError::AmountMismatch { expected: 30_000, received: 100 })
        );
    }

    #[test]
    fn booking_snapshots_the_selection() {
        let session = session_with_seats(2, &["A1"]);
        let now = Utc.with_ymd_and_hms(2025, 5, 10, 9, 30, 0).unwrap();
        let user = Principal::user("user-abc", "viewer@example.com");

        let booking = finalize_at(&session, &user, &confirmation(14_000), now).unwrap();

        assert!(booking.id.starts_with("booking-"));
        assert_eq!(booking.user_id, "user-abc");
        assert_eq!(booking.showtime_id, "showtime-1");
        assert_eq!(booking.seat_labels(), vec!["A1", "A2"]);
        assert_eq!(booking.total_amount, 140);
        assert_eq!(booking.booking_date, now);
        assert_eq!(booking.payment_status, PaymentStatus::Completed);
    }

    #[test]
    fn booking_ids_are_unique() {
        let session = session_with_seats(1, &["A1"]);
        let user = Principal::user("u", "a@b.c");
        let a = finalize(&session, &user, &confirmation(7_000)).unwrap();
        let b = finalize(&session, &user, &confirmation(7_000)).unwrap();
        assert_ne!(a.id, b.id);
    }
}
