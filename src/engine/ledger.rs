use std::collections::BTreeMap;
use std::collections::btree_map::Iter;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Represents a holding: how many units are held and at what average cost.
///
/// A position with quantity 0 is closed. It may stay in the ledger as a zero
/// record, its average cost is no longer observable and it is skipped by
/// valuation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    quantity: u64,
    avg_cost: f64,
}

impl Position {
    /// Returns the held quantity.
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Returns the weighted-average cost per unit, or `None` when the
    /// position is closed.
    pub fn avg_cost(&self) -> Option<f64> {
        self.is_open().then_some(self.avg_cost)
    }

    /// Returns `true` while at least one unit is held.
    pub fn is_open(&self) -> bool {
        self.quantity > 0
    }

    /// Returns the unrealized profit or loss against the given price.
    /// A closed position contributes nothing.
    pub fn unrealized_pl(&self, price: f64) -> f64 {
        (price - self.avg_cost) * self.quantity as f64
    }
}

/// One row of a portfolio valuation: a position priced against the market.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSnapshot {
    pub symbol: String,
    pub quantity: u64,
    pub avg_cost: f64,
    pub price: f64,
    pub unrealized_pl: f64,
}

/// Represents the position ledger: every holding of the session, keyed by
/// symbol.
///
/// Buys blend into the weighted-average cost; sells reduce quantity and
/// leave the average cost untouched. Valuation is computed on demand from
/// prices the caller supplies, never cached.
#[derive(Debug, Default)]
pub struct Ledger {
    positions: BTreeMap<String, Position>,
}

impl Ledger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds units to a position and reweights its average cost.
    ///
    /// `c_new = (c_old * q_old + price * qty) / (q_old + qty)`. A fresh or
    /// re-opened position ends up at exactly `price` through the same
    /// formula.
    ///
    /// Fails without mutating on a non-positive price, a zero quantity or a
    /// resulting quantity past `u64::MAX`.
    pub(crate) fn buy(&mut self, symbol: &str, price: f64, quantity: u64) -> Result<()> {
        if price <= 0.0 || !price.is_finite() {
            return Err(Error::InvalidPrice(price));
        }
        if quantity == 0 {
            return Err(Error::InvalidQuantity);
        }
        let new_quantity = self
            .quantity(symbol)
            .checked_add(quantity)
            .ok_or(Error::InvalidQuantity)?;

        let position = self.positions.entry(symbol.to_owned()).or_default();
        let held = position.quantity as f64;
        let bought = quantity as f64;
        position.avg_cost = (position.avg_cost * held + price * bought) / (held + bought);
        position.quantity = new_quantity;
        Ok(())
    }

    /// Removes units from a position and returns the realized profit or loss
    /// `(price - avg_cost) * qty`. The average cost of the remainder is
    /// unchanged.
    ///
    /// Fails without mutating when fewer units are held than requested.
    pub(crate) fn sell(&mut self, symbol: &str, price: f64, quantity: u64) -> Result<f64> {
        if price <= 0.0 || !price.is_finite() {
            return Err(Error::InvalidPrice(price));
        }
        if quantity == 0 {
            return Err(Error::InvalidQuantity);
        }

        let Some(position) = self.positions.get_mut(symbol) else {
            return Err(Error::InsufficientPosition(quantity, 0));
        };
        if position.quantity < quantity {
            return Err(Error::InsufficientPosition(quantity, position.quantity));
        }

        position.quantity -= quantity;
        Ok((price - position.avg_cost) * quantity as f64)
    }

    /// Returns the held quantity for a symbol, 0 when absent.
    pub fn quantity(&self, symbol: &str) -> u64 {
        self.positions.get(symbol).map_or(0, Position::quantity)
    }

    /// Returns the weighted-average cost for a symbol, `None` when the
    /// position is closed or absent.
    pub fn avg_cost(&self, symbol: &str) -> Option<f64> {
        self.positions.get(symbol).and_then(Position::avg_cost)
    }

    /// Returns the unrealized profit or loss of one position against the
    /// given price. Closed or absent positions contribute 0.
    pub fn unrealized_pl(&self, symbol: &str, price: f64) -> f64 {
        self.positions
            .get(symbol)
            .filter(|position| position.is_open())
            .map_or(0.0, |position| position.unrealized_pl(price))
    }

    /// Returns an iterator over every record, closed ones included, in
    /// symbol order.
    pub fn positions(&self) -> Iter<'_, String, Position> {
        self.positions.iter()
    }

    /// Returns an iterator over the open positions only, in symbol order.
    pub fn open_positions(&self) -> impl Iterator<Item = (&str, &Position)> {
        self.positions
            .iter()
            .filter(|(_, position)| position.is_open())
            .map(|(symbol, position)| (symbol.as_str(), position))
    }

    /// Returns the number of records, closed ones included.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` when the ledger holds no record at all.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buy_opens_position_at_price() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, 1).unwrap();

        assert_eq!(ledger.quantity("AAPL"), 1);
        assert_eq!(ledger.avg_cost("AAPL"), Some(150.0));
    }

    #[test]
    fn buy_reweights_average_cost() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, 1).unwrap();
        ledger.buy("AAPL", 160.0, 1).unwrap();

        // (150 * 1 + 160 * 1) / 2
        assert_eq!(ledger.quantity("AAPL"), 2);
        assert_eq!(ledger.avg_cost("AAPL"), Some(155.0));
    }

    #[test]
    fn buy_multiple_units_at_once() {
        let mut ledger = Ledger::new();
        ledger.buy("TSLA", 100.0, 2).unwrap();
        ledger.buy("TSLA", 110.0, 2).unwrap();

        // (100 * 2 + 110 * 2) / 4
        assert_eq!(ledger.quantity("TSLA"), 4);
        assert_eq!(ledger.avg_cost("TSLA"), Some(105.0));
    }

    #[test]
    fn buy_rejects_invalid_orders() {
        let mut ledger = Ledger::new();
        assert!(matches!(
            ledger.buy("AAPL", 0.0, 1),
            Err(Error::InvalidPrice(_))
        ));
        assert!(matches!(
            ledger.buy("AAPL", 150.0, 0),
            Err(Error::InvalidQuantity)
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn buy_and_sell_reject_non_finite_price() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, 1).unwrap();

        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                ledger.buy("AAPL", bad, 1),
                Err(Error::InvalidPrice(_))
            ));
            assert!(matches!(
                ledger.sell("AAPL", bad, 1),
                Err(Error::InvalidPrice(_))
            ));
        }
        assert_eq!(ledger.quantity("AAPL"), 1);
        assert_eq!(ledger.avg_cost("AAPL"), Some(150.0));
    }

    #[test]
    fn buy_rejects_quantity_overflow() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, u64::MAX).unwrap();

        let result = ledger.buy("AAPL", 150.0, 1);
        assert!(matches!(result, Err(Error::InvalidQuantity)));
        // rejected buys leave the position untouched
        assert_eq!(ledger.quantity("AAPL"), u64::MAX);
        assert_eq!(ledger.avg_cost("AAPL"), Some(150.0));
    }

    #[test]
    fn sell_keeps_average_cost() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, 1).unwrap();
        ledger.buy("AAPL", 160.0, 1).unwrap();

        let realized = ledger.sell("AAPL", 170.0, 1).unwrap();
        assert_eq!(realized, 15.0);
        assert_eq!(ledger.quantity("AAPL"), 1);
        assert_eq!(ledger.avg_cost("AAPL"), Some(155.0));
    }

    #[test]
    fn sell_at_loss_realizes_negative() {
        let mut ledger = Ledger::new();
        ledger.buy("TSLA", 700.0, 2).unwrap();

        let realized = ledger.sell("TSLA", 650.0, 2).unwrap();
        assert_eq!(realized, -100.0);
        assert_eq!(ledger.quantity("TSLA"), 0);
    }

    #[test]
    fn sell_more_than_held() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, 2).unwrap();

        let result = ledger.sell("AAPL", 150.0, 3);
        assert!(matches!(result, Err(Error::InsufficientPosition(3, 2))));
        // rejected sells leave the position untouched
        assert_eq!(ledger.quantity("AAPL"), 2);
        assert_eq!(ledger.avg_cost("AAPL"), Some(150.0));
    }

    #[test]
    fn sell_without_position() {
        let mut ledger = Ledger::new();
        let result = ledger.sell("AAPL", 150.0, 1);
        assert!(matches!(result, Err(Error::InsufficientPosition(1, 0))));
    }

    #[test]
    fn closed_position_hides_average_cost() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, 1).unwrap();
        ledger.sell("AAPL", 170.0, 1).unwrap();

        // the zero record stays, its cost basis does not
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.quantity("AAPL"), 0);
        assert_eq!(ledger.avg_cost("AAPL"), None);
        assert_eq!(ledger.open_positions().count(), 0);
    }

    #[test]
    fn reopened_position_costs_the_new_price() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, 1).unwrap();
        ledger.sell("AAPL", 170.0, 1).unwrap();
        ledger.buy("AAPL", 200.0, 1).unwrap();

        assert_eq!(ledger.quantity("AAPL"), 1);
        assert_eq!(ledger.avg_cost("AAPL"), Some(200.0));
    }

    #[test]
    fn unrealized_pl_against_price() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, 1).unwrap();
        ledger.buy("AAPL", 160.0, 1).unwrap();

        assert_eq!(ledger.unrealized_pl("AAPL", 170.0), 30.0);
        assert_eq!(ledger.unrealized_pl("AAPL", 155.0), 0.0);
        assert_eq!(ledger.unrealized_pl("AAPL", 140.0), -30.0);
    }

    #[test]
    fn unrealized_pl_of_closed_position_is_zero() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, 1).unwrap();
        ledger.sell("AAPL", 150.0, 1).unwrap();

        assert_eq!(ledger.unrealized_pl("AAPL", 9999.0), 0.0);
        assert_eq!(ledger.unrealized_pl("MSFT", 10.0), 0.0);
    }

    #[test]
    fn open_positions_skip_closed_records() {
        let mut ledger = Ledger::new();
        ledger.buy("AAPL", 150.0, 1).unwrap();
        ledger.buy("TSLA", 700.0, 1).unwrap();
        ledger.sell("AAPL", 160.0, 1).unwrap();

        let open: Vec<_> = ledger.open_positions().map(|(s, _)| s).collect();
        assert_eq!(open, vec!["TSLA"]);
        assert_eq!(ledger.len(), 2);
    }
}
