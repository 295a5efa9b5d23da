//! # Market From File
//!
//! Seeds the instrument table from a JSON listing file instead of hardcoded
//! prices, then runs a couple of trades against it.
//!
//! Requires the `serde` feature:
//!
//! ```bash
//! cargo run --example seedfile --features serde
//! ```

use anyhow::Result;
use pts_rs::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let listings = get_listings_from_file("data/markets.json".into())?;
    let market = Market::from_listings(&listings)?;

    println!("{:<6} | {:>10}", "symbol", "price");
    for quote in market.quotes() {
        println!("{:<6} | {:>10}", quote.symbol, quote.price.usd());
    }
    println!();

    let mut session = TradingSession::new(market, 10_000.0)?;
    session.buy("MSFT", 2)?;

    println!("bought 2 MSFT, balance {}", session.balance().usd());
    Ok(())
}
