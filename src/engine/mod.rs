//! Core trading session components.
//!
//! This module provides the fundamental types for a paper trading session:
//! - `Market`: Listed instruments with randomly drifting prices.
//! - `Ledger`: Holdings tracked at weighted-average cost.
//! - `Account`: Cash balance with overdraft-protected debits.
//! - `TransactionLog`: Append-only history of executed trades.
//!
//! [`TradingSession`] owns one of each and keeps them consistent: a trade
//! either applies to all of them or to none. [`SharedSession`] is the
//! cloneable handle for drivers whose callbacks fire from more than one
//! place.

mod account;
mod ledger;
mod market;
mod transaction;

use std::slice;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, info};
use rand::Rng;

use crate::errors::{Error, Result};
use crate::report::Report;

pub use account::*;
pub use ledger::*;
pub use market::*;
pub use transaction::*;

/// A single-user paper trading session.
///
/// The session is the only writer of its market, account, ledger and log.
/// Every trade is check-then-act: all validations run before the first
/// mutation, so a rejected trade leaves no trace.
#[derive(Debug)]
pub struct TradingSession {
    market: Market,
    account: Account,
    ledger: Ledger,
    log: TransactionLog,
}

impl std::ops::Deref for TradingSession {
    type Target = Account;

    fn deref(&self) -> &Self::Target {
        &self.account
    }
}

impl TradingSession {
    /// Opens a session over the given market with an opening cash balance.
    ///
    /// ### Arguments
    /// * `market` - The instruments this session can trade.
    /// * `opening_balance` - Starting cash; must not be negative.
    ///
    /// ### Returns
    /// The new session, or an error when the opening balance is negative.
    ///
    /// ### Example
    /// ```rust
    /// use pts_rs::prelude::*;
    ///
    /// let mut market = Market::new();
    /// market.list("AAPL", 150.0).unwrap();
    ///
    /// let mut session = TradingSession::new(market, 10_000.0).unwrap();
    /// session.buy("AAPL", 1).unwrap();
    ///
    /// assert_eq!(session.balance(), 9_850.0);
    /// assert_eq!(session.ledger().quantity("AAPL"), 1);
    /// ```
    pub fn new(market: Market, opening_balance: f64) -> Result<Self> {
        Ok(Self {
            market,
            ledger: Ledger::new(),
            log: TransactionLog::new(),
            account: Account::new(opening_balance)?,
        })
    }

    /// Returns the session's market.
    pub fn market(&self) -> &Market {
        &self.market
    }

    /// Returns the session's position ledger.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Returns an iterator over the executed trades, oldest first.
    pub fn transactions(&self) -> slice::Iter<'_, Transaction> {
        self.log.iter()
    }

    /// Buys `quantity` units of `symbol` at the current market price.
    ///
    /// The cash debit, the ledger update and the log entry happen as one
    /// unit: when any check fails, none of them is applied.
    ///
    /// ### Arguments
    /// * `symbol` - A listed symbol.
    /// * `quantity` - Units to buy; at least 1.
    ///
    /// ### Returns
    /// Ok if the trade executed, or an error
    /// ([`UnknownSymbol`](Error::UnknownSymbol),
    /// [`InvalidQuantity`](Error::InvalidQuantity),
    /// [`InsufficientFunds`](Error::InsufficientFunds)).
    ///
    /// ### Example
    /// ```rust
    /// use pts_rs::prelude::*;
    ///
    /// let mut market = Market::new();
    /// market.list("AAPL", 150.0).unwrap();
    /// market.list("GOOGL", 2800.0).unwrap();
    ///
    /// let mut session = TradingSession::new(market, 1_000.0).unwrap();
    /// session.buy("AAPL", 2).unwrap();
    ///
    /// assert_eq!(session.balance(), 700.0);
    /// let rejected = session.buy("GOOGL", 1);
    /// assert!(rejected.is_err());
    /// assert_eq!(session.balance(), 700.0);
    /// ```
    pub fn buy(&mut self, symbol: &str, quantity: u64) -> Result<()> {
        if quantity == 0 {
            return Err(Error::InvalidQuantity);
        }
        let price = self.market.get_price(symbol)?;
        let notional = price * quantity as f64;

        // the debit is the last fallible step; the ledger and log follow
        self.account.debit(notional)?;
        self.ledger.buy(symbol, price, quantity)?;
        self.log.push((Side::Buy, symbol, price, quantity).into());

        info!("BUY {quantity} {symbol} @ ${price:.2}");
        Ok(())
    }

    /// Sells `quantity` units of `symbol` at the current market price.
    ///
    /// The ledger decrement, the cash credit and the log entry happen as one
    /// unit: when any check fails, none of them is applied. Selling more
    /// than held is rejected outright, holdings never go negative.
    ///
    /// ### Arguments
    /// * `symbol` - A listed symbol.
    /// * `quantity` - Units to sell; at least 1 and at most the held amount.
    ///
    /// ### Returns
    /// The realized profit or loss `(price - avg_cost) * quantity`, or an
    /// error ([`UnknownSymbol`](Error::UnknownSymbol),
    /// [`InvalidQuantity`](Error::InvalidQuantity),
    /// [`InsufficientPosition`](Error::InsufficientPosition)).
    ///
    /// ### Example
    /// ```rust
    /// use pts_rs::prelude::*;
    ///
    /// let mut market = Market::new();
    /// market.list("AAPL", 150.0).unwrap();
    ///
    /// let mut session = TradingSession::new(market, 10_000.0).unwrap();
    /// session.buy("AAPL", 1).unwrap();
    /// session.set_price("AAPL", 170.0).unwrap();
    ///
    /// let realized = session.sell("AAPL", 1).unwrap();
    /// assert_eq!(realized, 20.0);
    /// assert_eq!(session.balance(), 10_020.0);
    /// ```
    pub fn sell(&mut self, symbol: &str, quantity: u64) -> Result<f64> {
        if quantity == 0 {
            return Err(Error::InvalidQuantity);
        }
        let price = self.market.get_price(symbol)?;

        // the ledger checks the held quantity and mutates only on success
        let realized = self.ledger.sell(symbol, price, quantity)?;
        self.account.credit(price * quantity as f64);
        self.log.push((Side::Sell, symbol, price, quantity).into());

        info!("SELL {quantity} {symbol} @ ${price:.2} (realized {realized:+.2})");
        Ok(realized)
    }

    /// Advances the market one tick: every price takes a uniform random
    /// step, clamped to the market floor. Valuation is derived on the next
    /// read, never cached.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.market.fluctuate(rng);
        debug!("tick: repriced {} instruments", self.market.len());
    }

    /// Replaces the price of a listed symbol.
    pub fn set_price(&mut self, symbol: &str, price: f64) -> Result<()> {
        self.market.set_price(symbol, price)
    }

    /// Returns an owned snapshot of every quote, in symbol order.
    pub fn quotes(&self) -> Vec<Quote> {
        self.market.quotes()
    }

    /// Values every open position against current prices, in symbol order.
    /// Closed positions are skipped.
    pub fn portfolio(&self) -> Result<Vec<PositionSnapshot>> {
        let mut rows = Vec::new();
        for (symbol, position) in self.ledger.open_positions() {
            let Some(avg_cost) = position.avg_cost() else {
                continue;
            };
            let price = self.market.get_price(symbol)?;
            rows.push(PositionSnapshot {
                symbol: symbol.to_owned(),
                quantity: position.quantity(),
                avg_cost,
                price,
                unrealized_pl: position.unrealized_pl(price),
            });
        }
        Ok(rows)
    }

    /// Returns the sum of unrealized profit or loss over the open positions.
    pub fn total_pl(&self) -> Result<f64> {
        let mut total = 0.0;
        for (symbol, position) in self.ledger.open_positions() {
            let price = self.market.get_price(symbol)?;
            total += position.unrealized_pl(price);
        }
        Ok(total)
    }

    /// Captures a consistent view of the whole session.
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        Ok(SessionSnapshot {
            balance: self.account.balance(),
            quotes: self.quotes(),
            portfolio: self.portfolio()?,
            total_pl: self.total_pl()?,
            transactions: self.log.len(),
        })
    }

    /// Renders the balance and open positions into an appendable [`Report`].
    pub fn report(&self) -> Result<Report> {
        Report::new(self)
    }
}

/// A consistent view of the whole session, captured in one read.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    /// Cash balance at capture time.
    pub balance: f64,
    /// Every quote, in symbol order.
    pub quotes: Vec<Quote>,
    /// Every open position valued at capture-time prices.
    pub portfolio: Vec<PositionSnapshot>,
    /// Sum of unrealized profit or loss over the open positions.
    pub total_pl: f64,
    /// Number of executed trades so far.
    pub transactions: usize,
}

/// A cloneable, thread-safe handle to a [`TradingSession`].
///
/// Drivers with timer callbacks hold one clone on the tick path and one on
/// the trade path; the mutex makes every operation a single critical
/// section, and [`snapshot`](SharedSession::snapshot) gives readers a
/// consistent copy instead of a lock held across rendering.
///
/// ### Example
/// ```rust
/// use pts_rs::prelude::*;
///
/// let mut market = Market::new();
/// market.list("AAPL", 150.0).unwrap();
/// let session = TradingSession::new(market, 10_000.0).unwrap();
///
/// let handle = SharedSession::from(session);
/// let trader = handle.clone();
///
/// trader.buy("AAPL", 1).unwrap();
/// assert_eq!(handle.snapshot().unwrap().balance, 9_850.0);
/// ```
#[derive(Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<TradingSession>>,
}

impl From<TradingSession> for SharedSession {
    fn from(session: TradingSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }
}

impl SharedSession {
    /// Wraps a session into a shareable handle.
    pub fn new(session: TradingSession) -> Self {
        session.into()
    }

    fn lock(&self) -> Result<MutexGuard<'_, TradingSession>> {
        self.inner.lock().map_err(|e| Error::Mutex(e.to_string()))
    }

    /// Buys at the current market price. One critical section.
    pub fn buy(&self, symbol: &str, quantity: u64) -> Result<()> {
        self.lock()?.buy(symbol, quantity)
    }

    /// Sells at the current market price and returns the realized profit or
    /// loss. One critical section.
    pub fn sell(&self, symbol: &str, quantity: u64) -> Result<f64> {
        self.lock()?.sell(symbol, quantity)
    }

    /// Advances the market one tick. One critical section.
    pub fn tick<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<()> {
        self.lock()?.tick(rng);
        Ok(())
    }

    /// Replaces the price of a listed symbol.
    pub fn set_price(&self, symbol: &str, price: f64) -> Result<()> {
        self.lock()?.set_price(symbol, price)
    }

    /// Returns the cash balance.
    pub fn balance(&self) -> Result<f64> {
        Ok(self.lock()?.balance())
    }

    /// Captures a consistent view of the whole session under one lock.
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        self.lock()?.snapshot()
    }

    /// Renders the report under one lock; the caller appends it to a file
    /// outside the critical section.
    pub fn report(&self) -> Result<Report> {
        self.lock()?.report()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_market() -> Market {
        let mut market = Market::new();
        market.list("AAPL", 150.0).unwrap();
        market.list("GOOGL", 2800.0).unwrap();
        market.list("TSLA", 700.0).unwrap();
        market
    }

    fn sample_session() -> TradingSession {
        TradingSession::new(sample_market(), 10_000.0).unwrap()
    }

    #[test]
    fn scenario_buy_reweights_and_sell_keeps_cost() {
        let mut session = sample_session();

        session.buy("AAPL", 1).unwrap();
        assert_eq!(session.balance(), 9_850.0);
        assert_eq!(session.ledger().quantity("AAPL"), 1);
        assert_eq!(session.ledger().avg_cost("AAPL"), Some(150.0));

        session.set_price("AAPL", 160.0).unwrap();
        session.buy("AAPL", 1).unwrap();
        assert_eq!(session.balance(), 9_690.0);
        assert_eq!(session.ledger().quantity("AAPL"), 2);
        assert_eq!(session.ledger().avg_cost("AAPL"), Some(155.0));

        session.set_price("AAPL", 170.0).unwrap();
        let realized = session.sell("AAPL", 1).unwrap();
        assert_eq!(realized, 15.0);
        assert_eq!(session.balance(), 9_860.0);
        assert_eq!(session.ledger().quantity("AAPL"), 1);
        assert_eq!(session.ledger().avg_cost("AAPL"), Some(155.0));
        assert_eq!(session.total_pl().unwrap(), 15.0);

        assert_eq!(session.transactions().len(), 3);
        let last = session.transactions().last().unwrap();
        assert_eq!(last.side(), Side::Sell);
        assert_eq!(last.price(), 170.0);
    }

    #[test]
    fn scenario_insufficient_funds_rejects_whole_trade() {
        let mut session = TradingSession::new(sample_market(), 100.0).unwrap();

        let result = session.buy("AAPL", 1);
        assert!(matches!(result, Err(Error::InsufficientFunds(_, _))));

        // nothing moved
        assert_eq!(session.balance(), 100.0);
        assert!(session.ledger().is_empty());
        assert_eq!(session.transactions().len(), 0);
    }

    #[test]
    fn scenario_sell_more_than_held_rejects_whole_trade() {
        let mut session = sample_session();
        session.buy("AAPL", 1).unwrap();

        let result = session.sell("AAPL", 2);
        assert!(matches!(result, Err(Error::InsufficientPosition(2, 1))));

        // nothing moved past the first buy
        assert_eq!(session.balance(), 9_850.0);
        assert_eq!(session.ledger().quantity("AAPL"), 1);
        assert_eq!(session.transactions().len(), 1);
    }

    #[test]
    fn scenario_sell_without_position() {
        let mut session = sample_session();
        let result = session.sell("TSLA", 1);
        assert!(matches!(result, Err(Error::InsufficientPosition(1, 0))));
        assert_eq!(session.balance(), 10_000.0);
    }

    #[test]
    fn scenario_unknown_symbol_rejected() {
        let mut session = sample_session();

        assert!(matches!(
            session.buy("MSFT", 1),
            Err(Error::UnknownSymbol(_))
        ));
        assert!(matches!(
            session.sell("MSFT", 1),
            Err(Error::UnknownSymbol(_))
        ));
        assert_eq!(session.balance(), 10_000.0);
        assert_eq!(session.transactions().len(), 0);
    }

    #[test]
    fn scenario_zero_quantity_rejected() {
        let mut session = sample_session();

        assert!(matches!(session.buy("AAPL", 0), Err(Error::InvalidQuantity)));
        assert!(matches!(
            session.sell("AAPL", 0),
            Err(Error::InvalidQuantity)
        ));
        assert_eq!(session.balance(), 10_000.0);
        assert!(session.ledger().is_empty());
    }

    #[test]
    fn scenario_multi_symbol_total_pl() {
        let mut session = sample_session();
        session.buy("AAPL", 1).unwrap();
        session.buy("TSLA", 2).unwrap();

        session.set_price("AAPL", 160.0).unwrap();
        session.set_price("TSLA", 690.0).unwrap();

        // +10 on AAPL, -10 per TSLA unit
        assert_eq!(session.total_pl().unwrap(), -10.0);

        let portfolio = session.portfolio().unwrap();
        assert_eq!(portfolio.len(), 2);
        assert_eq!(portfolio[0].symbol, "AAPL");
        assert_eq!(portfolio[0].unrealized_pl, 10.0);
        assert_eq!(portfolio[1].symbol, "TSLA");
        assert_eq!(portfolio[1].unrealized_pl, -20.0);
    }

    #[test]
    fn scenario_closed_position_leaves_valuation() {
        let mut session = sample_session();
        session.buy("AAPL", 1).unwrap();
        session.buy("TSLA", 1).unwrap();
        session.sell("AAPL", 1).unwrap();

        let portfolio = session.portfolio().unwrap();
        assert_eq!(portfolio.len(), 1);
        assert_eq!(portfolio[0].symbol, "TSLA");

        session.set_price("AAPL", 9_999.0).unwrap();
        assert_eq!(session.total_pl().unwrap(), 0.0);
    }

    #[test]
    fn scenario_tick_then_revalue() {
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let mut session = sample_session();
        session.buy("AAPL", 2).unwrap();
        session.buy("GOOGL", 1).unwrap();

        let mut rng = StdRng::seed_from_u64(21);
        session.tick(&mut rng);

        // rows are valued against post-tick prices, nothing is cached
        for row in session.portfolio().unwrap() {
            assert_eq!(row.price, session.market().get_price(&row.symbol).unwrap());
            assert_eq!(
                row.unrealized_pl,
                (row.price - row.avg_cost) * row.quantity as f64
            );
        }

        let total: f64 = session
            .portfolio()
            .unwrap()
            .iter()
            .map(|row| row.unrealized_pl)
            .sum();
        assert_eq!(session.total_pl().unwrap(), total);
    }

    #[test]
    fn scenario_snapshot_is_consistent() {
        let mut session = sample_session();
        session.buy("AAPL", 1).unwrap();
        session.set_price("AAPL", 160.0).unwrap();

        let snapshot = session.snapshot().unwrap();
        assert_eq!(snapshot.balance, 9_850.0);
        assert_eq!(snapshot.quotes.len(), 3);
        assert_eq!(snapshot.portfolio.len(), 1);
        assert_eq!(snapshot.total_pl, 10.0);
        assert_eq!(snapshot.transactions, 1);
    }

    #[test]
    fn scenario_shared_session_serializes_trades() {
        let session = TradingSession::new(sample_market(), 10_000.0).unwrap();
        let handle = SharedSession::new(session);

        std::thread::scope(|scope| {
            for _ in 0..4 {
                let trader = handle.clone();
                scope.spawn(move || {
                    for _ in 0..5 {
                        trader.buy("AAPL", 1).unwrap();
                    }
                });
            }
        });

        let snapshot = handle.snapshot().unwrap();
        assert_eq!(snapshot.balance, 7_000.0);
        assert_eq!(snapshot.transactions, 20);

        let quantity = handle.lock().unwrap().ledger().quantity("AAPL");
        assert_eq!(quantity, 20);
    }

    #[test]
    fn scenario_poisoned_lock_surfaces_as_error() {
        let session = TradingSession::new(sample_market(), 10_000.0).unwrap();
        let handle = SharedSession::new(session);

        let poisoner = handle.clone();
        let outcome = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the session lock");
        })
        .join();
        assert!(outcome.is_err());

        assert!(matches!(handle.balance(), Err(Error::Mutex(_))));
        assert!(matches!(handle.buy("AAPL", 1), Err(Error::Mutex(_))));
        assert!(matches!(handle.snapshot(), Err(Error::Mutex(_))));
    }

    #[test]
    fn scenario_shared_session_rejections() {
        let session = TradingSession::new(sample_market(), 100.0).unwrap();
        let handle = SharedSession::new(session);

        assert!(handle.buy("AAPL", 1).is_err());
        assert!(handle.sell("AAPL", 1).is_err());
        assert_eq!(handle.balance().unwrap(), 100.0);
    }
}
