//! Seat inventory for a single showtime.
//!
//! A map is always 10 rows (A-J) of 20 seats, sorted by row then number.
//! Which seats are already taken is decided by an [`Occupancy`] source so that
//! production can use a random one while tests pin the layout down.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::selection::Selection;
use crate::models::{Row, Seat, SeatId, SeatStatus};

pub const SEATS_PER_ROW: u8 = 20;
pub const ROW_COUNT: usize = 10;

/// Two fixed price tiers, keyed by row class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatPricing {
    pub premium: i64,
    pub regular: i64,
}

impl Default for SeatPricing {
    fn default() -> Self {
        Self {
            premium: 70,
            regular: 150,
        }
    }
}

impl SeatPricing {
    pub fn price_for(&self, row: Row) -> i64 {
        if row.is_premium() {
            self.premium
        } else {
            self.regular
        }
    }
}

/// Decides whether a seat is already taken when the map is built.
pub trait Occupancy {
    fn is_booked(&mut self, showtime_id: &str, row: Row, number: u8) -> bool;
}

/// Marks every seat booked independently with a fixed probability.
#[derive(Debug)]
pub struct RandomOccupancy<R> {
    rng: R,
    probability: f64,
}

impl<R: Rng> RandomOccupancy<R> {
    pub fn new(rng: R, probability: f64) -> Self {
        Self {
            rng,
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl RandomOccupancy<StdRng> {
    pub fn seeded(seed: u64, probability: f64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), probability)
    }

    pub fn from_entropy(probability: f64) -> Self {
        Self::new(StdRng::from_entropy(), probability)
    }
}

impl<R: Rng> Occupancy for RandomOccupancy<R> {
    fn is_booked(&mut self, _showtime_id: &str, _row: Row, _number: u8) -> bool {
        self.rng.gen_bool(self.probability)
    }
}

/// Precomputed occupancy: the listed seat labels (e.g. `"C5"`) are booked, the rest are free.
#[derive(Debug, Clone, Default)]
pub struct FixedOccupancy {
    booked: HashSet<String>,
}

impl FixedOccupancy {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            booked: labels
                .into_iter()
                .map(|label| label.into().to_ascii_uppercase())
                .collect(),
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

impl Occupancy for FixedOccupancy {
    fn is_booked(&mut self, _showtime_id: &str, row: Row, number: u8) -> bool {
        self.booked.contains(&format!("{}{}", row, number))
    }
}

pub struct SeatMapGenerator {
    pricing: SeatPricing,
    occupancy: Box<dyn Occupancy + Send>,
}

impl SeatMapGenerator {
    pub fn new(pricing: SeatPricing, occupancy: impl Occupancy + Send + 'static) -> Self {
        Self {
            pricing,
            occupancy: Box::new(occupancy),
        }
    }

    pub fn generate(&mut self, showtime_id: &str) -> SeatMap {
        let mut seats = Vec::with_capacity(ROW_COUNT * SEATS_PER_ROW as usize);
        for row in Row::all() {
            for number in 1..=SEATS_PER_ROW {
                let status = if self.occupancy.is_booked(showtime_id, row, number) {
                    SeatStatus::Booked
                } else {
                    SeatStatus::Available
                };
                seats.push(Seat {
                    id: SeatId::new(showtime_id, row, number),
                    row,
                    number,
                    price: self.pricing.price_for(row),
                    status,
                });
            }
        }
        SeatMap::from_seats(showtime_id, seats)
    }
}

impl std::fmt::Debug for SeatMapGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeatMapGenerator")
            .field("pricing", &self.pricing)
            .finish_non_exhaustive()
    }
}

/// Seat inventory for one showtime. Seats only carry `Available` or `Booked`;
/// the `Selected` status exists only in [`SeatMap::view`].
#[derive(Debug, Clone)]
pub struct SeatMap {
    showtime_id: String,
    seats: Vec<Seat>,
    index: HashMap<SeatId, usize>,
}

impl SeatMap {
    pub fn from_seats(showtime_id: impl Into<String>, mut seats: Vec<Seat>) -> Self {
        seats.sort_by(|a, b| a.row.cmp(&b.row).then(a.number.cmp(&b.number)));
        let index = seats
            .iter()
            .enumerate()
            .map(|(i, seat)| (seat.id.clone(), i))
            .collect();
        Self {
            showtime_id: showtime_id.into(),
            seats,
            index,
        }
    }

    pub fn showtime_id(&self) -> &str {
        &self.showtime_id
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn get(&self, id: &SeatId) -> Option<&Seat> {
        self.index.get(id).map(|&i| &self.seats[i])
    }

    pub fn row(&self, row: Row) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(move |seat| seat.row == row)
    }

    pub fn available_count(&self) -> usize {
        self.seats.iter().filter(|seat| !seat.is_booked()).count()
    }

    /// Display copy of the inventory with membership in `selection` shown as `Selected`.
    pub fn view(&self, selection: &Selection) -> Vec<Seat> {
        self.seats
            .iter()
            .map(|seat| {
                let mut shown = seat.clone();
                if !seat.is_booked() && selection.contains(&seat.id) {
                    shown.status = SeatStatus::Selected;
                }
                shown
            })
            .collect()
    }
}
