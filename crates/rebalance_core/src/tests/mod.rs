//! Integration tests exercising the builder DSL across multiple modules.
//!
//! Per-module unit tests live inline in each module's own `#[cfg(test)] mod
//! tests`; these integration tests check scenarios that span the category
//! tree, weight resolver, allocator, closure pass, and synthesiser together
//! through the public `Engine` entry point, the same split the teacher uses
//! between its inline module tests and `finplan_core::tests::*`.

mod classification;
mod closure;
mod market;

use rustc_hash::FxHashMap;

use crate::engine::AccountInput;
use crate::model::account::Account;
use crate::model::holding::Holding;
use crate::model::ticker::Ticker;

/// Assembles one [`AccountInput`] from an account and its (ticker, holding)
/// pairs, used by every integration test to avoid repeating the
/// `FxHashMap` bookkeeping `Engine::rebalance_portfolio` expects.
pub(super) fn account_input(account: Account, entries: Vec<(Ticker, Holding)>) -> AccountInput {
    let mut tickers = FxHashMap::default();
    let mut holdings = FxHashMap::default();
    for (ticker, holding) in entries {
        let symbol = ticker.symbol.clone();
        tickers.insert(symbol.clone(), ticker);
        holdings.insert(symbol, holding);
    }
    AccountInput {
        account,
        tickers,
        holdings,
    }
}
