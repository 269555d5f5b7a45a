//! Unique identifiers for domain entities
//!
//! Each entity type has its own ID type to provide type safety and prevent
//! mixing up different kinds of identifiers.

use serde::{Deserialize, Serialize};

/// Opaque key identifying a portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortfolioId(pub u32);

/// Identifies an institution holding one or more accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InstitutionId(pub u32);

/// An account is identified by (institution, account-number) per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountKey {
    pub institution: InstitutionId,
    pub account_number: u64,
}

/// A ticker symbol. Small strings are common (1-5 characters); stored as an
/// owned `String` rather than an interned id since the engine processes one
/// account's ticker set at a time and never needs cross-account identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TickerSymbol(pub String);

impl TickerSymbol {
    pub fn new(symbol: impl Into<String>) -> Self {
        TickerSymbol(symbol.into())
    }
}

impl std::fmt::Display for TickerSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index into the static, flat-arena category (weight-type) tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub u16);
