//! Ticker definitions (spec §3).

use serde::{Deserialize, Serialize};

use crate::model::ids::TickerSymbol;
use crate::model::subcode::Subcodes;

/// Whether the engine is permitted to move money into or out of a ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickerKind {
    /// Open-end fund; the engine may buy/sell fractional or whole shares.
    FundRebalanceable,
    /// Fund the engine must leave alone (e.g. closed to new purchases).
    FundNotRebalanceable,
    /// A single stock/bond position; passed through like a debt holding.
    SingleSecurity,
    /// Exchange-traded fund; rebalanceable, usually with non-zero rounding.
    Etf,
}

impl TickerKind {
    /// Per spec glossary: "balanceable" holdings are fund-rebalanceable and
    /// ETF kinds.
    pub fn is_balanceable(self) -> bool {
        matches!(self, TickerKind::FundRebalanceable | TickerKind::Etf)
    }
}

/// A tradeable instrument. Immutable for the duration of one engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: TickerSymbol,
    pub kind: TickerKind,
    /// Smallest non-zero magnitude a holding of this ticker may carry. May
    /// be negative (a credit limit on a single-security debt-like holding).
    pub min_investment: f64,
    /// Share-quantity step; zero permits fractional shares.
    pub preferred_rounding: f64,
    pub subcodes: Subcodes,
}

impl Ticker {
    pub fn new(symbol: impl Into<String>, kind: TickerKind) -> Self {
        Ticker {
            symbol: TickerSymbol::new(symbol),
            kind,
            min_investment: 0.0,
            preferred_rounding: 0.0,
            subcodes: Subcodes::NONE,
        }
    }

    pub fn with_min_investment(mut self, min_investment: f64) -> Self {
        self.min_investment = min_investment;
        self
    }

    pub fn with_rounding(mut self, preferred_rounding: f64) -> Self {
        self.preferred_rounding = preferred_rounding;
        self
    }

    pub fn with_subcodes(mut self, subcodes: Subcodes) -> Self {
        self.subcodes = subcodes;
        self
    }

    pub fn rounds(&self) -> bool {
        self.preferred_rounding > 0.0
    }
}
