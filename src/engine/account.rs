#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// Represents the session's cash account.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug)]
pub struct Account {
    // Balance at session start, kept for performance summaries
    opening_balance: f64,
    // Available cash
    balance: f64,
}

impl Account {
    /// Creates a new account with the given opening balance.
    /// Negative balances are rejected; an empty account is allowed.
    pub fn new(balance: f64) -> Result<Self> {
        if balance < 0.0 {
            return Err(Error::NegativeBalance(balance));
        }

        Ok(Self {
            balance,
            opening_balance: balance,
        })
    }

    /// Returns the available cash balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// Returns the balance the session started with.
    pub fn opening_balance(&self) -> f64 {
        self.opening_balance
    }

    /// Removes cash from the account (when a buy is executed).
    /// Fails without mutating when the amount exceeds the balance.
    /// Amounts are engine-computed notionals and therefore non-negative.
    pub(crate) fn debit(&mut self, amount: f64) -> Result<f64> {
        if amount > self.balance {
            return Err(Error::InsufficientFunds(amount, self.balance));
        }
        self.balance -= amount;
        Ok(self.balance)
    }

    /// Adds cash to the account (when a sell is executed).
    /// Amounts are engine-computed notionals and therefore non-negative.
    pub(crate) fn credit(&mut self, amount: f64) -> f64 {
        self.balance += amount;
        self.balance
    }
}

#[cfg(test)]
#[test]
fn new_account_valid_balance() {
    let account = Account::new(100.0).unwrap();
    assert_eq!(account.balance(), 100.0);
    assert_eq!(account.opening_balance(), 100.0);
}

#[cfg(test)]
#[test]
fn new_account_zero_balance() {
    let account = Account::new(0.0).unwrap();
    assert_eq!(account.balance(), 0.0);
}

#[cfg(test)]
#[test]
fn new_account_negative_balance() {
    let result = Account::new(-10.0);
    assert!(matches!(result, Err(Error::NegativeBalance(_))));
}

#[cfg(test)]
#[test]
fn debit_within_balance() {
    let mut account = Account::new(100.0).unwrap();
    let balance = account.debit(40.0).unwrap();
    assert_eq!(balance, 60.0);
    assert_eq!(account.balance(), 60.0);
}

#[cfg(test)]
#[test]
fn debit_full_balance() {
    let mut account = Account::new(100.0).unwrap();
    let balance = account.debit(100.0).unwrap();
    assert_eq!(balance, 0.0);
}

#[cfg(test)]
#[test]
fn debit_insufficient_funds() {
    let mut account = Account::new(100.0).unwrap();
    let result = account.debit(150.0);
    assert!(matches!(result, Err(Error::InsufficientFunds(_, _))));
    // rejected debits leave the balance untouched
    assert_eq!(account.balance(), 100.0);
}

#[cfg(test)]
#[test]
fn credit_funds() {
    let mut account = Account::new(100.0).unwrap();
    let balance = account.credit(50.0);
    assert_eq!(balance, 150.0);
    assert_eq!(account.balance(), 150.0);
}

#[cfg(test)]
#[test]
fn debit_credit_profit_cycle() {
    let mut account = Account::new(100.0).unwrap();

    // buy
    account.debit(20.0).unwrap();
    assert_eq!(account.balance(), 80.0);

    // sell higher
    account.credit(30.0);
    assert_eq!(account.balance(), 110.0);
    assert_eq!(account.opening_balance(), 100.0);
}
