//! Balance and profit/loss reporting.
//!
//! This module renders a session's balance and open positions into the
//! plain-text block appended to the history file:
//!
//! ```text
//! Balance: $9860.00
//! AAPL | Qty: 1 | P/L: $15.00
//! ------------
//! ```
//!
//! Every currency value carries exactly two decimals, closed positions are
//! left out, and blocks only ever accumulate at the end of the file.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use log::info;

use crate::CurrencyFormat;
use crate::engine::{PositionSnapshot, TradingSession};
use crate::errors::Result;

/// Terminator line separating appended report blocks.
pub const REPORT_SEPARATOR: &str = "------------";

/// A rendered snapshot of the balance and the open positions.
///
/// `Display` produces the exact block format;
/// [`append_to`](Report::append_to) adds one block to the end of a history
/// file, creating it on first use.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    balance: f64,
    positions: Vec<PositionSnapshot>,
}

impl Report {
    /// Captures the balance and the open positions of a session.
    pub fn new(session: &TradingSession) -> Result<Self> {
        Ok(Self {
            balance: session.balance(),
            positions: session.portfolio()?,
        })
    }

    /// Returns the captured balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Returns the captured open positions, in symbol order.
    pub fn positions(&self) -> std::slice::Iter<'_, PositionSnapshot> {
        self.positions.iter()
    }

    /// Appends this report to the history file at `path`.
    ///
    /// The file is created when missing; existing blocks are never
    /// rewritten.
    pub fn append_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let mut file = OpenOptions::new().append(true).create(true).open(path)?;
        write!(file, "{self}")?;
        info!("report appended to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Balance: {}", self.balance.usd())?;
        for row in &self.positions {
            writeln!(
                f,
                "{} | Qty: {} | P/L: {}",
                row.symbol,
                row.quantity,
                row.unrealized_pl.usd()
            )?;
        }
        writeln!(f, "{REPORT_SEPARATOR}")
    }
}

#[cfg(test)]
// Session with two open positions and pinned prices, so the block is known.
fn sample_session() -> TradingSession {
    use crate::engine::Market;

    let mut market = Market::new();
    market.list("AAPL", 150.0).unwrap();
    market.list("TSLA", 700.0).unwrap();

    let mut session = TradingSession::new(market, 10_000.0).unwrap();
    session.buy("AAPL", 1).unwrap();
    session.buy("TSLA", 1).unwrap();
    session.set_price("AAPL", 165.0).unwrap();
    session.set_price("TSLA", 690.5).unwrap();
    session
}

#[cfg(test)]
#[test]
fn report_block_format() {
    let session = sample_session();
    let report = session.report().unwrap();

    assert_eq!(
        report.to_string(),
        "Balance: $9150.00\n\
         AAPL | Qty: 1 | P/L: $15.00\n\
         TSLA | Qty: 1 | P/L: $-9.50\n\
         ------------\n"
    );
}

#[cfg(test)]
#[test]
fn report_skips_closed_positions() {
    let mut session = sample_session();
    session.sell("TSLA", 1).unwrap();

    let report = session.report().unwrap();
    let symbols: Vec<_> = report.positions().map(|row| row.symbol.clone()).collect();
    assert_eq!(symbols, vec!["AAPL"]);
    assert!(!report.to_string().contains("TSLA"));
}

#[cfg(test)]
#[test]
fn report_of_flat_session() {
    use crate::engine::Market;

    let mut market = Market::new();
    market.list("AAPL", 150.0).unwrap();
    let session = TradingSession::new(market, 10_000.0).unwrap();

    let report = session.report().unwrap();
    assert_eq!(report.to_string(), "Balance: $10000.00\n------------\n");
}

#[cfg(test)]
#[test]
fn append_accumulates_blocks() {
    let session = sample_session();
    let report = session.report().unwrap();

    let path = std::env::temp_dir().join(format!("pl_history_{}.txt", std::process::id()));
    std::fs::remove_file(&path).ok();

    report.append_to(&path).unwrap();
    report.append_to(&path).unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content, report.to_string().repeat(2));

    std::fs::remove_file(&path).ok();
}
