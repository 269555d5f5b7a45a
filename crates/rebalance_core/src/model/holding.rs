//! Holdings: an (account, ticker) instance (spec §3).

use serde::{Deserialize, Serialize};

use crate::model::ids::TickerSymbol;

/// A position in one ticker within one account.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub shares: f64,
    pub price: f64,
    /// `None` until derived (shares * price) or supplied directly; may be
    /// negative for debt.
    value: Option<f64>,
    /// Non-negative multiplier controlling relative share among same-leaf
    /// tickers; 0 withholds the ticker from allocation entirely.
    pub holding_weight: f64,
}

impl Default for Holding {
    fn default() -> Self {
        Holding {
            shares: 0.0,
            price: 0.0,
            value: None,
            holding_weight: 1.0,
        }
    }
}

impl Holding {
    pub fn from_shares_and_price(shares: f64, price: f64) -> Self {
        Holding {
            shares,
            price,
            value: None,
            holding_weight: 1.0,
        }
    }

    pub fn from_value(value: f64) -> Self {
        Holding {
            shares: 0.0,
            price: 0.0,
            value: Some(value),
            holding_weight: 1.0,
        }
    }

    pub fn with_holding_weight(mut self, holding_weight: f64) -> Self {
        self.holding_weight = holding_weight;
        self
    }

    /// Value is shares * price when explicit shares/price are known,
    /// otherwise the directly-supplied value (e.g. a synthesized annuity
    /// balance, which has no share count).
    pub fn value(&self) -> f64 {
        self.value.unwrap_or(self.shares * self.price)
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = Some(value);
    }

    pub fn is_withheld(&self) -> bool {
        self.holding_weight <= 0.0
    }
}

/// (symbol, holding) pair used when building an account's current book.
pub type HoldingEntry = (TickerSymbol, Holding);
