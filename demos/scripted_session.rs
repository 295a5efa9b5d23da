//! # Scripted Session Walkthrough
//!
//! Pins prices between trades to show the cost-basis rules: two buys blend
//! the weighted-average cost, the sell realizes against it and leaves the
//! cost basis of the remaining units untouched.
mod utils;

use anyhow::Result;
use pts_rs::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut session = TradingSession::new(utils::seed_market()?, 10_000.0)?;

    session.buy("AAPL", 1)?;
    println!(
        "bought 1 AAPL @ $150.00 -> balance {}",
        session.balance().usd()
    );

    session.set_price("AAPL", 160.0)?;
    session.buy("AAPL", 1)?;
    println!(
        "bought 1 AAPL @ $160.00 -> balance {}, avg cost {}",
        session.balance().usd(),
        session.ledger().avg_cost("AAPL").unwrap_or_default().usd()
    );

    session.set_price("AAPL", 170.0)?;
    let realized = session.sell("AAPL", 1)?;
    println!(
        "sold 1 AAPL @ $170.00 -> balance {}, realized {}",
        session.balance().usd(),
        realized.usd()
    );
    println!();

    utils::print_snapshot(&session)?;
    println!();

    print!("{}", session.report()?);
    Ok(())
}
