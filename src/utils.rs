#[cfg(feature = "serde")]
use serde::Deserialize;

// [
//   { "symbol": "AAPL", "price": 150.0 },
//   { "ticker": "GOOGL", "last": 2800.0 }
// ]

/// A symbol/price seed record used to list instruments on a market.
#[cfg_attr(feature = "serde", derive(Deserialize))]
#[derive(Debug, Clone)]
pub struct Listing {
    #[cfg_attr(feature = "serde", serde(alias = "ticker"))]
    symbol: String,
    #[cfg_attr(feature = "serde", serde(alias = "last"))]
    price: f64,
}

type L1 = (String, f64);
type L2<'a> = (&'a str, f64);

impl From<L1> for Listing {
    fn from((symbol, price): L1) -> Self {
        Self { symbol, price }
    }
}

impl From<L2<'_>> for Listing {
    fn from((symbol, price): L2) -> Self {
        (symbol.to_owned(), price).into()
    }
}

impl Listing {
    /// Returns the listed symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the listing price.
    pub fn price(&self) -> f64 {
        self.price
    }
}

#[cfg(feature = "serde")]
/// Reads listings from `filepath` and returns them.
pub fn get_listings_from_file(filepath: std::path::PathBuf) -> crate::errors::Result<Vec<Listing>> {
    use crate::errors::Error;
    use std::{fs::File, io::BufReader};

    let file = File::open(filepath)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(Error::from)
}

#[cfg(test)]
#[test]
fn listing_from_tuple() {
    let listing: Listing = ("AAPL", 150.0).into();
    assert_eq!(listing.symbol(), "AAPL");
    assert_eq!(listing.price(), 150.0);
}

#[cfg(test)]
#[cfg(feature = "serde")]
#[test]
fn parse_listings_with_aliases() {
    let json = r#"[
        { "symbol": "AAPL", "price": 150.0 },
        { "ticker": "GOOGL", "last": 2800.0 }
    ]"#;

    let listings: Vec<Listing> = serde_json::from_str(json).unwrap();
    assert_eq!(listings.len(), 2);
    assert_eq!(listings[0].symbol(), "AAPL");
    assert_eq!(listings[1].symbol(), "GOOGL");
    assert_eq!(listings[1].price(), 2800.0);
}
