use std::collections::BTreeMap;
use std::collections::btree_map::Iter;

use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::utils::Listing;

/// Default lower bound a fluctuating price can reach.
pub const DEFAULT_FLOOR: f64 = 1.0;
/// Default half-width of the uniform fluctuation range.
pub const DEFAULT_DRIFT: f64 = 5.0;

/// A symbol with its current price, copied out of the market.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
}

/// Represents the in-memory market: listed instruments and their current prices.
///
/// Instruments are created by [`list`](Market::list) and never removed. Prices
/// move through [`set_price`](Market::set_price) or [`fluctuate`](Market::fluctuate)
/// and stay strictly positive.
#[derive(Debug)]
pub struct Market {
    prices: BTreeMap<String, f64>,
    floor: f64,
    drift: f64,
}

impl Default for Market {
    fn default() -> Self {
        Self::new()
    }
}

impl Market {
    /// Creates an empty market with the default floor and drift.
    pub fn new() -> Self {
        Self {
            prices: BTreeMap::new(),
            floor: DEFAULT_FLOOR,
            drift: DEFAULT_DRIFT,
        }
    }

    /// Creates a market listing every entry of `listings`.
    ///
    /// ### Arguments
    ///
    /// * `listings` - Symbol/price seed records, e.g. loaded from a JSON file.
    ///
    /// ### Returns
    ///
    /// A market quoting every listing, or an error if any price is not
    /// strictly positive.
    pub fn from_listings(listings: &[Listing]) -> Result<Self> {
        let mut market = Self::new();
        for listing in listings {
            market.list(listing.symbol(), listing.price())?;
        }
        Ok(market)
    }

    /// Replaces the fluctuation floor. The floor must be strictly positive
    /// and finite.
    pub fn with_floor(mut self, floor: f64) -> Result<Self> {
        if floor <= 0.0 || !floor.is_finite() {
            return Err(Error::InvalidPrice(floor));
        }
        self.floor = floor;
        Ok(self)
    }

    /// Replaces the fluctuation half-width. The drift must be strictly
    /// positive and finite.
    pub fn with_drift(mut self, drift: f64) -> Result<Self> {
        if drift <= 0.0 || !drift.is_finite() {
            return Err(Error::InvalidPrice(drift));
        }
        self.drift = drift;
        Ok(self)
    }

    /// Lists an instrument at the given price, or re-prices an existing one.
    /// Fails when the price is not strictly positive and finite.
    pub fn list(&mut self, symbol: impl Into<String>, price: f64) -> Result<()> {
        if price <= 0.0 || !price.is_finite() {
            return Err(Error::InvalidPrice(price));
        }
        self.prices.insert(symbol.into(), price);
        Ok(())
    }

    /// Returns the current price of a listed symbol.
    pub fn get_price(&self, symbol: &str) -> Result<f64> {
        self.prices
            .get(symbol)
            .copied()
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_owned()))
    }

    /// Replaces the price of a listed symbol.
    /// Fails when the price is not strictly positive and finite, or the
    /// symbol is unlisted.
    pub fn set_price(&mut self, symbol: &str, price: f64) -> Result<()> {
        if price <= 0.0 || !price.is_finite() {
            return Err(Error::InvalidPrice(price));
        }
        match self.prices.get_mut(symbol) {
            Some(stored) => {
                *stored = price;
                Ok(())
            }
            None => Err(Error::UnknownSymbol(symbol.to_owned())),
        }
    }

    /// Moves every listed price by a uniform random step.
    ///
    /// Each instrument draws its own delta from `[-drift, +drift]` and the
    /// result is clamped to the floor, so prices never leave the positive
    /// range. The generator is injected: drivers pass [`rand::rng()`], tests
    /// pass a seeded [`rand::rngs::StdRng`] for reproducible walks.
    ///
    /// ### Example
    ///
    /// ```rust
    /// use pts_rs::prelude::*;
    /// use rand::{SeedableRng, rngs::StdRng};
    ///
    /// let mut market = Market::new();
    /// market.list("AAPL", 150.0).unwrap();
    ///
    /// let mut rng = StdRng::seed_from_u64(7);
    /// market.fluctuate(&mut rng);
    ///
    /// let price = market.get_price("AAPL").unwrap();
    /// assert!(price >= 145.0 && price <= 155.0);
    /// ```
    pub fn fluctuate<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for price in self.prices.values_mut() {
            let delta = rng.random_range(-self.drift..=self.drift);
            *price = (*price + delta).max(self.floor);
        }
    }

    /// Returns the number of listed instruments.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// Returns `true` when no instrument is listed.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Returns `true` when the symbol is listed.
    pub fn contains(&self, symbol: &str) -> bool {
        self.prices.contains_key(symbol)
    }

    /// Returns an iterator over `(symbol, price)` pairs in symbol order.
    pub fn iter(&self) -> Iter<'_, String, f64> {
        self.prices.iter()
    }

    /// Returns an owned snapshot of every quote, in symbol order.
    pub fn quotes(&self) -> Vec<Quote> {
        self.prices
            .iter()
            .map(|(symbol, price)| Quote {
                symbol: symbol.clone(),
                price: *price,
            })
            .collect()
    }

    /// Returns the fluctuation floor.
    pub fn floor(&self) -> f64 {
        self.floor
    }

    /// Returns the fluctuation half-width.
    pub fn drift(&self) -> f64 {
        self.drift
    }
}
