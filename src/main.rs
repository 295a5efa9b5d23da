use anyhow::Result;
use pts_rs::prelude::*;

const REPORT_FILE: &str = "profit_loss_history.txt";

fn main() -> Result<()> {
    env_logger::init();

    let mut market = Market::new();
    market.list("AAPL", 150.0)?;
    market.list("GOOGL", 2800.0)?;
    market.list("TSLA", 700.0)?;

    let mut session = TradingSession::new(market, 10_000.0)?;
    let mut rng = rand::rng();

    session.buy("AAPL", 1)?;
    session.buy("TSLA", 2)?;

    for _ in 0..5 {
        session.tick(&mut rng);
    }

    let realized = session.sell("AAPL", 1)?;
    println!("realized on AAPL: {}", realized.usd());
    println!();

    println!("--- market ---");
    for quote in session.quotes() {
        println!("{:<6} {}", quote.symbol, quote.price.usd());
    }
    println!();

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
    println!();

    println!("--- transactions ---");
    for transaction in session.transactions() {
        println!("{transaction}");
    }
    println!();

    println!("Balance: {}", session.balance().usd());
    println!("Total P/L: {}", session.total_pl()?.usd());

    session.report()?.append_to(REPORT_FILE)?;
    println!("history appended to {REPORT_FILE}");

    Ok(())
}
