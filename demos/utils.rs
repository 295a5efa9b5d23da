use pts_rs::prelude::*;

/// Lists the classic three instruments at their opening prices.
pub fn seed_market() -> Result<Market> {
    let mut market = Market::new();
    market.list("AAPL", 150.0)?;
    market.list("GOOGL", 2800.0)?;
    market.list("TSLA", 700.0)?;
    Ok(market)
}

/// Prints the quotes, the open positions and the session totals.
pub fn print_snapshot(session: &TradingSession) -> Result<()> {
    println!("--- market ---");
    for quote in session.quotes() {
        println!("{:<6} {}", quote.symbol, quote.price.usd());
    }

    println!("--- portfolio ---");
    for row in session.portfolio()? {
        println!(
            "{:<6} qty {:<3} avg {:<9} now {:<9} p/l {}",
            row.symbol,
            row.quantity,
            row.avg_cost.usd(),
            row.price.usd(),
            row.unrealized_pl.usd()
        );
    }

    println!("Balance: {}", session.balance().usd());
    println!("Total P/L: {}", session.total_pl()?.usd());
    Ok(())
}
