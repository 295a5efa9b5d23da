use std::fmt;
use std::slice;

use chrono::{DateTime, Utc};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::CurrencyFormat;

/// Represents the side of a trade (buy or sell).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// Represents one executed trade.
///
/// Renders as `BUY - AAPL @ $150.00`. The log position is the authoritative
/// ordering; the timestamp records the wall-clock execution time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    side: Side,
    symbol: String,
    price: f64,
    quantity: u64,
    executed_at: DateTime<Utc>,
}

type T1 = (Side, String, f64, u64);
type T2<'a> = (Side, &'a str, f64, u64);

impl From<T1> for Transaction {
    fn from((side, symbol, price, quantity): T1) -> Self {
        Self {
            side,
            symbol,
            price,
            quantity,
            executed_at: Utc::now(),
        }
    }
}

impl From<T2<'_>> for Transaction {
    fn from((side, symbol, price, quantity): T2) -> Self {
        (side, symbol.to_owned(), price, quantity).into()
    }
}

impl Transaction {
    /// Returns the trade side.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Returns the traded symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the execution price per unit.
    pub fn price(&self) -> f64 {
        self.price
    }

    /// Returns the traded quantity.
    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Returns the wall-clock execution time.
    pub fn executed_at(&self) -> DateTime<Utc> {
        self.executed_at
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {} @ {}", self.side, self.symbol, self.price.usd())
    }
}

/// Append-only record of every executed trade, in execution order.
#[derive(Debug, Default)]
pub struct TransactionLog {
    entries: Vec<Transaction>,
}

impl TransactionLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a trade. Entries are never updated or removed.
    pub(crate) fn push(&mut self, transaction: Transaction) {
        self.entries.push(transaction);
    }

    /// Returns an iterator over the trades, oldest first.
    pub fn iter(&self) -> slice::Iter<'_, Transaction> {
        self.entries.iter()
    }

    /// Returns the most recent trade, if any.
    pub fn last(&self) -> Option<&Transaction> {
        self.entries.last()
    }

    /// Returns the number of recorded trades.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` while no trade has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[test]
fn create_transaction() {
    let before = Utc::now();
    let transaction: Transaction = (Side::Buy, "AAPL", 150.0, 1).into();
    let after = Utc::now();

    assert_eq!(transaction.side(), Side::Buy);
    assert_eq!(transaction.symbol(), "AAPL");
    assert_eq!(transaction.price(), 150.0);
    assert_eq!(transaction.quantity(), 1);
    assert!(transaction.executed_at() >= before);
    assert!(transaction.executed_at() <= after);
}

#[cfg(test)]
#[test]
fn transaction_display() {
    let buy: Transaction = (Side::Buy, "AAPL", 150.0, 1).into();
    assert_eq!(buy.to_string(), "BUY - AAPL @ $150.00");

    let sell: Transaction = (Side::Sell, "TSLA", 649.5, 2).into();
    assert_eq!(sell.to_string(), "SELL - TSLA @ $649.50");
}

#[cfg(test)]
#[test]
fn side_display() {
    assert_eq!(Side::Buy.to_string(), "BUY");
    assert_eq!(Side::Sell.to_string(), "SELL");
}

#[cfg(test)]
#[test]
fn log_keeps_insertion_order() {
    let mut log = TransactionLog::new();
    assert!(log.is_empty());

    log.push((Side::Buy, "AAPL", 150.0, 1).into());
    log.push((Side::Buy, "TSLA", 700.0, 1).into());
    log.push((Side::Sell, "AAPL", 160.0, 1).into());

    assert_eq!(log.len(), 3);
    let symbols: Vec<_> = log.iter().map(Transaction::symbol).collect();
    assert_eq!(symbols, vec!["AAPL", "TSLA", "AAPL"]);

    let last = log.last().unwrap();
    assert_eq!(last.side(), Side::Sell);
    assert_eq!(last.price(), 160.0);
}
