//! Domain model: the category taxonomy, tickers, holdings, accounts, and
//! portfolios that the allocator and synthesiser operate over.

mod account;
mod category_tree;
mod holding;
mod ids;
mod portfolio;
mod subcode;
mod ticker;
pub mod weights;

pub use account::{
    Account, DetailOverride, RebalanceProcedure, SynthesizerConfig, SynthesizerKind, TaxType,
};
pub use category_tree::{CategoryNode, CategoryTree, Level1Ids};
pub use holding::{Holding, HoldingEntry};
pub use ids::{AccountKey, CategoryId, InstitutionId, PortfolioId, TickerSymbol};
pub use portfolio::{FilingStatus, Level1Weights, Portfolio};
pub use subcode::{Subcode, Subcodes};
pub use ticker::{Ticker, TickerKind};
