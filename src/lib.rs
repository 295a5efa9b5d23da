//! # PTS: Paper Trading Session simulator
//!
//! **PTS** is a self-contained Rust library that simulates a single-user stock
//! trading session: an in-memory market with drifting prices, a cash account,
//! a position ledger at weighted-average cost, and an append-only transaction
//! log, all kept consistent by one session object.
//!
//! ## Why PTS?
//! - **Atomic trades**: Every buy and sell is check-then-act. A rejected trade
//!   leaves the balance, the ledger and the log exactly as they were.
//! - **Honest accounting**: Weighted-average cost on buys, untouched cost
//!   basis on sells, and valuation derived from live prices instead of caches.
//! - **Reproducible markets**: The price walk takes any [`rand::Rng`], so a
//!   seeded generator replays the same session tick for tick.
//! - **Driver-agnostic**: Run it from a script, a REPL, or timer callbacks
//!   through the thread-safe [`SharedSession`](engine::SharedSession) handle.
//!
//! ## Core Components
//! | Component   | Description                                                              |
//! |-------------|--------------------------------------------------------------------------|
//! | **`Market`** | Listed instruments with strictly positive, randomly drifting prices.   |
//! | **`Ledger`** | Holdings per symbol: quantity and weighted-average cost.                |
//! | **`Account`** | Cash balance with overdraft-protected debits.                          |
//! | **`TransactionLog`** | Append-only history of executed trades, oldest first.           |
//! | **`TradingSession`** | The engine tying the four together with atomic trades.          |
//! | **`SharedSession`** | Cloneable `Arc<Mutex<_>>` handle for multi-callback drivers.     |
//! | **`Report`** | Appendable plain-text block: balance plus per-position unrealized P/L.  |
//!
//! ## Getting Started
//! ### 1. Add PTS to your project:
//! ```toml
//! [dependencies]
//! pts-rs = "*"
//! rand = "*"
//! ```
//!
//! ### 2. Run a Simple Session:
//! ```rust
//! use pts_rs::prelude::*;
//! use rand::{SeedableRng, rngs::StdRng};
//!
//! fn main() {
//!     let mut market = Market::new();
//!     market.list("AAPL", 150.0).unwrap();
//!     market.list("GOOGL", 2800.0).unwrap();
//!     market.list("TSLA", 700.0).unwrap();
//!
//!     // Open the session with $10,000
//!     let mut session = TradingSession::new(market, 10_000.0).unwrap();
//!
//!     session.buy("AAPL", 1).unwrap();
//!     session.buy("TSLA", 2).unwrap();
//!
//!     // One market tick with a reproducible walk
//!     let mut rng = StdRng::seed_from_u64(42);
//!     session.tick(&mut rng);
//!
//!     let realized = session.sell("AAPL", 1).unwrap();
//!     println!("realized: {}", realized.usd());
//!
//!     // Render the balance and open positions as one report block
//!     let report = session.report().unwrap();
//!     println!("{report}");
//! }
//! ```
//!
//! ### Output:
//! ```bash
//! realized: $2.05
//! Balance: $8602.05
//! TSLA | Qty: 2 | P/L: $-3.10
//! ------------
//! ```
//!
//! ## Report format
//! One block per export, appended to the end of the history file: a
//! `Balance: $…` line, one `SYMBOL | Qty: … | P/L: $…` line per open
//! position, and a `------------` terminator. Currency always carries two
//! decimals; closed positions are left out.
//!
//! ## Error Handling
//! PTS uses a custom error type to handle:
//! - Unknown symbols and non-positive or non-finite prices.
//! - Buys beyond the cash balance.
//! - Sells beyond the held quantity (holdings never go negative).
//!
//! Example:
//! ```rust
//! use pts_rs::prelude::*;
//!
//! fn main() {
//!     let mut market = Market::new();
//!     market.list("GOOGL", 2800.0).unwrap();
//!
//!     let mut session = TradingSession::new(market, 1_000.0).unwrap();
//!
//!     match session.buy("GOOGL", 1) {
//!         Ok(_) => println!("position opened"),
//!         Err(Error::InsufficientFunds(required, available)) => {
//!             eprintln!("short {} of cash", (required - available).usd())
//!         }
//!         Err(e) => eprintln!("trade rejected: {e}"),
//!     }
//! }
//! ```
//!
//! ## Integrations
//! | Crate          | Purpose                                                  |
//! |----------------|----------------------------------------------------------|
//! | [`rand`](https://crates.io/crates/rand) | Injectable price-walk randomness.       |
//! | [`chrono`](https://crates.io/crates/chrono) | Transaction timestamps.             |
//! | [`serde`](https://crates.io/crates/serde) | Serialize snapshots, load market seed files (`serde` feature). |
//! | [`log`](https://crates.io/crates/log) | Trade and report logging.                 |
//!
//! ## License
//! MIT
#![warn(missing_docs)]

/// Core trading session components: market, ledger, account, transactions.
pub mod engine;

/// Error types for the library.
pub mod errors;

/// Balance and profit/loss report export.
pub mod report;

/// Market seed records and file loading helpers.
pub mod utils;

/// Re-exports of commonly used types and traits for convenience.
pub mod prelude {
    pub use super::*;
    pub use crate::engine::*;
    pub use crate::errors::*;
    pub use crate::report::*;
    pub use crate::utils::*;
}

/// Trait for rendering currency amounts.
///
/// Every user-facing currency value carries exactly two decimals, negative
/// amounts included (`$-9.50`). The report and transaction rendering go
/// through this trait.
pub trait CurrencyFormat {
    /// Renders the amount as dollars with exactly two decimals.
    ///
    /// ### Example
    /// ```rust
    /// use pts_rs::prelude::*;
    ///
    /// assert_eq!("$150.00", 150.0.usd());
    /// ```
    fn usd(&self) -> String;
}

impl CurrencyFormat for f64 {
    fn usd(&self) -> String {
        format!("${self:.2}")
    }
}

#[cfg(test)]
mod currency {
    use super::*;

    #[test]
    fn whole_amounts() {
        assert_eq!("$150.00", 150.0.usd())
    }

    #[test]
    fn cents() {
        assert_eq!("$9.50", 9.5.usd())
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!("$1234.57", 1234.567.usd())
    }

    #[test]
    fn negative_amounts() {
        assert_eq!("$-9.50", (-9.5).usd())
    }

    #[test]
    fn zero() {
        assert_eq!("$0.00", 0.0.usd())
    }
}
