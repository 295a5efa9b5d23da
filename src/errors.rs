pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The market does not list the requested symbol.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Prices, floors and drift ranges must be strictly positive.
    #[error("Invalid price (got: {0})")]
    InvalidPrice(f64),

    /// Orders must move at least one unit and holdings must stay
    /// representable.
    #[error("Invalid quantity: orders move at least one unit within range")]
    InvalidQuantity,

    /// The account does not have enough cash to cover the trade.
    /// Required: {0}, Available: {1}
    #[error("Insufficient funds: required {0:.2}, available {1:.2}")]
    InsufficientFunds(f64, f64),

    /// The ledger does not hold enough units to sell.
    /// Requested: {0}, Held: {1}
    #[error("Insufficient position: requested {0}, held {1}")]
    InsufficientPosition(u64, u64),

    /// The opening balance is negative. Sessions start with zero or more cash.
    #[error("Opening balance must not be negative (got: {0})")]
    NegativeBalance(f64),

    /// A shared session lock was poisoned by a panicking holder.
    #[error("Session lock poisoned: {0}")]
    Mutex(String),

    /// I/O error occurred.
    // report.rs
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error occurred.
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
