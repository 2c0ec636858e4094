use serde::Serialize;

use super::{seat_map::SeatMap, selection::Selection};

/// The booking flow charges no convenience fee.
pub const CONVENIENCE_FEE: i64 = 0;

/// Sum of the prices of every selected seat. Always computed from the live selection.
pub fn total(selection: &Selection, map: &SeatMap) -> i64 {
    selection.seats(map).iter().map(|seat| seat.price).sum()
}

/// Payment widgets take amounts in the currency's minor unit.
pub fn minor_units(amount: i64) -> i64 {
    amount * 100
}

/// Order summary shown before payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub seat_count: usize,
    pub seats: Vec<String>,
    pub subtotal: i64,
    pub convenience_fee: i64,
    pub total: i64,
}

impl Quote {
    pub fn for_selection(selection: &Selection, map: &SeatMap) -> Self {
        let seats = selection.seats(map);
        let subtotal: i64 = seats.iter().map(|seat| seat.price).sum();
        Self {
            seat_count: seats.len(),
            seats: seats.iter().map(|seat| seat.label()).collect(),
            subtotal,
            convenience_fee: CONVENIENCE_FEE,
            total: subtotal + CONVENIENCE_FEE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::seat_map::{FixedOccupancy, SeatMapGenerator, SeatPricing};
    use crate::models::SeatId;

    fn map() -> SeatMap {
        SeatMapGenerator::new(SeatPricing { premium: 70, regular: 150 }, FixedOccupancy::none())
            .generate("st")
    }

    #[test]
    fn empty_selection_costs_nothing() {
        assert_eq!(total(&Selection::default(), &map()), 0);
    }

    #[test]
    fn total_is_the_sum_across_price_tiers() {
        let map = map();
        let mut selection = Selection::default();
        selection.set_target_count(3).unwrap();
        selection.select_seat(&map, &SeatId::from("st-B19"));

        // B19, B20 premium; auto-fill then wraps left to B18, also premium.
        assert_eq!(total(&selection, &map), 210);

        selection.deselect_seat(&SeatId::from("st-B18"));
        selection.select_seat(&map, &SeatId::from("st-C1"));
        assert_eq!(total(&selection, &map), 70 + 70 + 150);
    }

    #[test]
    fn removing_every_seat_returns_to_zero() {
        let map = map();
        let mut selection = Selection::default();
        selection.set_target_count(4).unwrap();
        selection.select_seat(&map, &SeatId::from("st-E1"));
        assert_eq!(total(&selection, &map), 600);

        for id in selection.ids().to_vec() {
            selection.deselect_seat(&id);
        }
        assert_eq!(total(&selection, &map), 0);
    }

    #[test]
    fn quote_lists_seats_and_totals() {
        let map = map();
        let mut selection = Selection::default();
        selection.set_target_count(2).unwrap();
        selection.select_seat(&map, &SeatId::from("st-A1"));

        let quote = Quote::for_selection(&selection, &map);

        assert_eq!(quote.seats, vec!["A1", "A2"]);
        assert_eq!(quote.seat_count, 2);
        assert_eq!(quote.subtotal, 140);
        assert_eq!(quote.total, 140);
        assert_eq!(minor_units(quote.total), 14_000);
    }
}
