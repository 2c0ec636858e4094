//! Wizard-scoped booking state for one user.
//!
//! The step is never stored; it is derived from which fields are filled in.
//! Re-entering an earlier step drops everything downstream of it, so a new
//! theatre never carries the old movie, showtime or seats along.

use serde::Serialize;
use uuid::Uuid;

use super::{
    finalizer::{self, PaymentConfirmation},
    pricing::{self, Quote},
    seat_map::SeatMap,
    selection::{Notice, SelectOutcome, Selection},
    BookingError,
};
use crate::models::{Booking, Movie, Principal, SeatId, Showtime, Theatre, Ticket};

pub const CURRENCY: &str = "INR";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum WizardStep {
    Empty,
    TheatreChosen,
    MovieChosen,
    ShowtimeChosen,
    SeatsChosen { complete: bool },
    PaymentPending,
    Booked,
}

/// What the payment widget is opened with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub order_id: String,
    /// Minor units.
    pub amount: i64,
    pub currency: String,
    pub description: String,
    pub quote: Quote,
}

#[derive(Debug, Clone, Default)]
pub struct BookingSession {
    theatre: Option<Theatre>,
    movie: Option<Movie>,
    showtime: Option<Showtime>,
    seat_map: Option<SeatMap>,
    selection: Selection,
    payment_pending: bool,
    booking: Option<Booking>,
}

impl BookingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        if self.booking.is_some() {
            WizardStep::Booked
        } else if self.payment_pending {
            WizardStep::PaymentPending
        } else if self.seat_map.is_some() {
            WizardStep::SeatsChosen {
                complete: self.selection.is_complete(),
            }
        } else if self.showtime.is_some() {
            WizardStep::ShowtimeChosen
        } else if self.movie.is_some() {
            WizardStep::MovieChosen
        } else if self.theatre.is_some() {
            WizardStep::TheatreChosen
        } else {
            WizardStep::Empty
        }
    }

    pub fn theatre(&self) -> Option<&Theatre> {
        self.theatre.as_ref()
    }

    pub fn movie(&self) -> Option<&Movie> {
        self.movie.as_ref()
    }

    pub fn showtime(&self) -> Option<&Showtime> {
        self.showtime.as_ref()
    }

    pub fn seat_map(&self) -> Option<&SeatMap> {
        self.seat_map.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn booking(&self) -> Option<&Booking> {
        self.booking.as_ref()
    }

    /// Theatre, movie, showtime and seat map, or the first one that is missing.
    pub fn context(&self) -> Result<(&Theatre, &Movie, &Showtime, &SeatMap), BookingError> {
        let theatre = self.theatre.as_ref().ok_or(BookingError::MissingContext("theatre"))?;
        let movie = self.movie.as_ref().ok_or(BookingError::MissingContext("movie"))?;
        let showtime = self.showtime.as_ref().ok_or(BookingError::MissingContext("showtime"))?;
        let map = self.seat_map.as_ref().ok_or(BookingError::MissingContext("seat map"))?;
        Ok((theatre, movie, showtime, map))
    }

    pub fn choose_theatre(&mut self, theatre: Theatre) {
        self.movie = None;
        self.drop_showtime();
        self.theatre = Some(theatre);
    }

    pub fn choose_movie(&mut self, movie: Movie) -> Result<(), BookingError> {
        if self.theatre.is_none() {
            return Err(BookingError::MissingContext("theatre"));
        }
        self.drop_showtime();
        self.movie = Some(movie);
        Ok(())
    }

    pub fn choose_showtime(&mut self, showtime: Showtime) -> Result<(), BookingError> {
        let theatre = self.theatre.as_ref().ok_or(BookingError::MissingContext("theatre"))?;
        let movie = self.movie.as_ref().ok_or(BookingError::MissingContext("movie"))?;
        if showtime.theatre_id != theatre.id || showtime.movie_id != movie.id {
            return Err(BookingError::ShowtimeMismatch { showtime: showtime.id });
        }
        self.drop_showtime();
        self.showtime = Some(showtime);
        Ok(())
    }

    /// Clears any previous selection, then builds the inventory for the chosen showtime.
    pub fn enter_seat_selection<F>(&mut self, generate: F) -> Result<&SeatMap, BookingError>
    where
        F: FnOnce(&str) -> SeatMap,
    {
        let showtime_id = self
            .showtime
            .as_ref()
            .ok_or(BookingError::MissingContext("showtime"))?
            .id
            .clone();

        self.drop_seats();
        let map = generate(&showtime_id);
        if map.showtime_id() != showtime_id {
            return Err(BookingError::SeatMapMismatch {
                expected: showtime_id,
                actual: map.showtime_id().to_string(),
            });
        }
        Ok(self.seat_map.insert(map))
    }

    /// An invalid count is reported back as a notice and changes nothing.
    pub fn set_target_count(&mut self, count: u32) -> Result<Option<Notice>, BookingError> {
        self.ensure_open()?;
        if let Err(notice) = self.selection.set_target_count(count) {
            return Ok(Some(notice));
        }
        self.payment_pending = false;
        Ok(None)
    }

    pub fn select_seat(&mut self, id: &SeatId) -> Result<SelectOutcome, BookingError> {
        self.ensure_open()?;
        let map = self.seat_map.as_ref().ok_or(BookingError::MissingContext("seat map"))?;
        let outcome = self.selection.select_seat(map, id);
        if outcome.notice().is_none() {
            self.payment_pending = false;
        }
        Ok(outcome)
    }

    pub fn deselect_seat(&mut self, id: &SeatId) -> Result<bool, BookingError> {
        self.ensure_open()?;
        let removed = self.selection.deselect_seat(id);
        if removed {
            self.payment_pending = false;
        }
        Ok(removed)
    }

    pub fn clear_selection(&mut self) -> Result<(), BookingError> {
        self.ensure_open()?;
        self.selection.clear();
        self.payment_pending = false;
        Ok(())
    }

    pub fn total_amount(&self) -> i64 {
        self.seat_map
            .as_ref()
            .map_or(0, |map| pricing::total(&self.selection, map))
    }

    pub fn quote(&self) -> Option<Quote> {
        self.seat_map
            .as_ref()
            .map(|map| Quote::for_selection(&self.selection, map))
    }

    pub fn begin_payment(&mut self) -> Result<PaymentRequest, BookingError> {
        self.ensure_open()?;
        let (theatre, movie, _, map) = self.context()?;
        if !self.selection.is_complete() {
            return Err(BookingError::IncompleteSelection {
                selected: self.selection.len(),
                target: self.selection.target().get(),
            });
        }
        if !theatre.has_payment_gateway {
            return Err(BookingError::PaymentUnavailable);
        }

        let quote = Quote::for_selection(&self.selection, map);
        let request = PaymentRequest {
            order_id: format!("order-{}", Uuid::new_v4().simple()),
            amount: pricing::minor_units(quote.total),
            currency: CURRENCY.to_string(),
            description: format!("Movie Tickets for {}", movie.title),
            quote,
        };
        self.payment_pending = true;
        Ok(request)
    }

    /// Payment was declined or abandoned; the selection stays for a retry.
    pub fn payment_failed(&mut self) -> bool {
        std::mem::replace(&mut self.payment_pending, false)
    }

    pub fn confirm_payment(
        &mut self,
        user: &Principal,
        confirmation: &PaymentConfirmation,
    ) -> Result<&Booking, BookingError> {
        self.ensure_open()?;
        if !self.payment_pending {
            return Err(BookingError::PaymentNotStarted);
        }
        let booking = finalizer::finalize(self, user, confirmation)?;
        self.payment_pending = false;
        Ok(self.booking.insert(booking))
    }

    pub fn ticket(&self) -> Option<Ticket> {
        Some(Ticket {
            booking: self.booking.clone()?,
            theatre: self.theatre.clone()?,
            movie: self.movie.clone()?,
            showtime: self.showtime.clone()?,
        })
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// A confirmed booking freezes the seats until `reset()`.
    fn ensure_open(&self) -> Result<(), BookingError> {
        match self.booking {
            Some(_) => Err(BookingError::AlreadyBooked),
            None => Ok(()),
        }
    }

    fn drop_showtime(&mut self) {
        self.showtime = None;
        self.drop_seats();
    }

    fn drop_seats(&mut self) {
        self.seat_map = None;
        self.selection.clear();
        self.payment_pending = false;
        self.booking = None;
    }
}
