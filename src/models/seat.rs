use serde::{Deserialize, Serialize};
use std::fmt;

/// Seat identifier, unique within one showtime (`"{showtime_id}-{row}{number}"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(String);

impl SeatId {
    pub fn new(showtime_id: &str, row: Row, number: u8) -> Self {
        Self(format!("{}-{}{}", showtime_id, row, number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for SeatId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for SeatId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Seat row letter, `A` (closest to the screen) through `J`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Row(char);

impl Row {
    pub const FIRST: char = 'A';
    pub const LAST: char = 'J';

    pub fn new(letter: char) -> Option<Self> {
        let letter = letter.to_ascii_uppercase();
        (Self::FIRST..=Self::LAST).contains(&letter).then_some(Self(letter))
    }

    /// All rows in screen order.
    pub fn all() -> impl Iterator<Item = Row> {
        (Self::FIRST..=Self::LAST).map(Row)
    }

    pub fn letter(self) -> char {
        self.0
    }

    /// Rows A and B are priced at the premium tier.
    pub fn is_premium(self) -> bool {
        matches!(self.0, 'A' | 'B')
    }
}

impl TryFrom<char> for Row {
    type Error = String;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        Row::new(value).ok_or_else(|| format!("row must be a letter A-J, got '{}'", value))
    }
}

impl From<Row> for char {
    fn from(row: Row) -> Self {
        row.0
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    /// Display-only; never stored on a seat in the inventory.
    Selected,
    Booked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub row: Row,
    pub number: u8,
    pub price: i64,
    pub status: SeatStatus,
}

impl Seat {
    pub fn is_booked(&self) -> bool {
        self.status == SeatStatus::Booked
    }

    /// Human label such as `C5`.
    pub fn label(&self) -> String {
        format!("{}{}", self.row, self.number)
    }
}
