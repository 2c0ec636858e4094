//! Seat selection against a showtime's inventory.
//!
//! The selection holds seat ids only; prices and statuses are always read back
//! from the [`SeatMap`]. Rejected actions are reported as a [`Notice`] and leave
//! the selection exactly as it was.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;

use super::seat_map::SeatMap;
use crate::models::{Seat, SeatId};

/// How many seats the user intends to book, 1 to 8.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u8")]
pub struct TargetCount(u8);

impl TargetCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8;

    pub fn new(count: u32) -> Result<Self, Notice> {
        if (Self::MIN as u32..=Self::MAX as u32).contains(&count) {
            Ok(Self(count as u8))
        } else {
            Err(Notice::InvalidSeatCount { requested: count })
        }
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl Default for TargetCount {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u32> for TargetCount {
    type Error = Notice;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TargetCount> for u8 {
    fn from(count: TargetCount) -> Self {
        count.0
    }
}

/// User-facing reason a seat action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    SeatBooked { seat: String },
    CapacityReached { target: u8 },
    UnknownSeat { seat: String },
    InvalidSeatCount { requested: u32 },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::SeatBooked { .. } => write!(f, "This seat is already booked"),
            Notice::CapacityReached { target } => write!(f, "You can only select {} seat(s)", target),
            Notice::UnknownSeat { seat } => write!(f, "Seat {} does not exist for this showtime", seat),
            Notice::InvalidSeatCount { requested } => write!(
                f,
                "Number of seats must be between {} and {}, got {}",
                TargetCount::MIN,
                TargetCount::MAX,
                requested
            ),
        }
    }
}

impl std::error::Error for Notice {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    /// `seat` was added; `auto_filled` are the neighbours picked alongside it.
    Added { seat: SeatId, auto_filled: Vec<SeatId> },
    /// `seat` was already selected and has been toggled off.
    Removed { seat: SeatId },
    Rejected(Notice),
}

impl SelectOutcome {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            SelectOutcome::Rejected(notice) => Some(notice),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    target: TargetCount,
    seats: Vec<SeatId>,
}

impl Selection {
    pub fn target(&self) -> TargetCount {
        self.target
    }

    pub fn ids(&self) -> &[SeatId] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.seats.len() == self.target.get()
    }

    pub fn contains(&self, id: &SeatId) -> bool {
        self.seats.iter().any(|selected| selected == id)
    }

    /// Selected seats resolved against `map`, in selection order.
    pub fn seats<'m>(&self, map: &'m SeatMap) -> Vec<&'m Seat> {
        self.seats.iter().filter_map(|id| map.get(id)).collect()
    }

    /// Changing the target always discards the current selection.
    pub fn set_target_count(&mut self, count: u32) -> Result<(), Notice> {
        self.target = TargetCount::new(count)?;
        self.seats.clear();
        Ok(())
    }

    pub fn select_seat(&mut self, map: &SeatMap, id: &SeatId) -> SelectOutcome {
        let Some(seat) = map.get(id) else {
            return SelectOutcome::Rejected(Notice::UnknownSeat { seat: id.to_string() });
        };

        if seat.is_booked() {
            return SelectOutcome::Rejected(Notice::SeatBooked { seat: seat.label() });
        }

        if self.contains(id) {
            self.deselect_seat(id);
            return SelectOutcome::Removed { seat: id.clone() };
        }

        if self.seats.len() >= self.target.get() {
            return SelectOutcome::Rejected(Notice::CapacityReached {
                target: self.target.into(),
            });
        }

        let was_empty = self.seats.is_empty();
        self.seats.push(seat.id.clone());

        let auto_filled = if was_empty && self.target.get() > 1 {
            self.auto_fill(map, seat)
        } else {
            Vec::new()
        };

        SelectOutcome::Added {
            seat: seat.id.clone(),
            auto_filled,
        }
    }

    pub fn deselect_seat(&mut self, id: &SeatId) -> bool {
        let before = self.seats.len();
        self.seats.retain(|selected| selected != id);
        self.seats.len() != before
    }

    pub fn clear(&mut self) {
        self.seats.clear();
    }

    /// Fills the remaining slots from the anchor's row: nearest seats to the
    /// right first, then nearest to the left.
    fn auto_fill(&mut self, map: &SeatMap, anchor: &Seat) -> Vec<SeatId> {
        let wanted = self.target.get().saturating_sub(self.seats.len());
        if wanted == 0 {
            return Vec::new();
        }

        let (mut right, mut left): (Vec<&Seat>, Vec<&Seat>) = map
            .row(anchor.row)
            .filter(|seat| !seat.is_booked() && seat.id != anchor.id && !self.contains(&seat.id))
            .partition(|seat| seat.number > anchor.number);
        right.sort_by_key(|seat| seat.number);
        left.sort_by_key(|seat| Reverse(seat.number));

        let picked: Vec<SeatId> = right
            .into_iter()
            .chain(left)
            .take(wanted)
            .map(|seat| seat.id.clone())
            .collect();
        self.seats.extend(picked.iter().cloned());
        picked
    }
}
