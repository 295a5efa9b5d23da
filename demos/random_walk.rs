//! # Random Walk Session
//!
//! Drives a whole session from one seeded generator: the price walk and the
//! trade coin flips both draw from it, so the same seed replays the same
//! session tick for tick.
mod utils;

use anyhow::Result;
use pts_rs::prelude::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

fn main() -> Result<()> {
    env_logger::init();

    let mut session = TradingSession::new(utils::seed_market()?, 10_000.0)?;
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..30 {
        session.tick(&mut rng);

        let quotes = session.quotes();
        let quote = &quotes[rng.random_range(0..quotes.len())];

        if rng.random_bool(0.5) {
            if quote.price <= session.balance() {
                session.buy(&quote.symbol, 1)?;
            }
        } else if session.ledger().quantity(&quote.symbol) > 0 {
            session.sell(&quote.symbol, 1)?;
        }
    }

    utils::print_snapshot(&session)?;
    println!();

    let holdings: f64 = session
        .portfolio()?
        .iter()
        .map(|row| row.price * row.quantity as f64)
        .sum();
    let equity = session.balance() + holdings;
    let opening = session.opening_balance();
    let performance = (equity - opening) / opening * 100.0;
    println!("equity {} ({performance:+.2}%)", equity.usd());
    println!("trades {}", session.transactions().len());

    Ok(())
}
