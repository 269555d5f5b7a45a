//! Integration coverage for ticker classification (spec §4.1) as seen
//! through [`crate::engine::Engine`] rather than [`crate::model::CategoryTree`]
//! directly: a ticker with inconsistent subcodes must not abort the account,
//! only diagnose and fall back to passing its current value through
//! unchanged.

use jiff::civil::date;

use crate::builder::{AccountBuilder, HoldingBuilder, PortfolioBuilder, TickerBuilder};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::DiagnosticKind;
use crate::model::ids::TickerSymbol;
use crate::model::CategoryTree;
use crate::tests::account_input;

#[test]
fn conflicting_subcodes_are_diagnosed_and_passed_through() {
    let tree = CategoryTree::standard();
    let config = EngineConfig::default();
    let engine = Engine::new(&tree, &config, date(2025, 1, 1));

    let portfolio = PortfolioBuilder::new(1).level1_weights(0.0, 0.0, 100.0, 0.0).build();
    let account = AccountBuilder::new(1, 1, 1).build();
    // S (Stock) and B (Bond) can never both attest the root's children.
    let broken = TickerBuilder::fund_rebalanceable("BROKEN").subcodes_str("SB").build();
    let input = account_input(account, vec![(broken, HoldingBuilder::value(1_000.0).build())]);

    let result = engine.rebalance_portfolio(&portfolio, &[input]);
    let account_result = &result.accounts[0];

    assert_eq!(
        account_result.proposed_values[&TickerSymbol::new("BROKEN")],
        1_000.0,
        "a ticker that can't be classified passes its current value through unchanged"
    );
    assert!(
        account_result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::InconsistentSubcodes)
    );
}

#[test]
fn non_rebalanceable_funds_pass_through_regardless_of_subcodes() {
    let tree = CategoryTree::standard();
    let config = EngineConfig::default();
    let engine = Engine::new(&tree, &config, date(2025, 1, 1));

    let portfolio = PortfolioBuilder::new(1).level1_weights(0.0, 0.0, 100.0, 0.0).build();
    let account = AccountBuilder::new(1, 1, 1).build();
    let closed_fund = TickerBuilder::fund_not_rebalanceable("CLOSED").subcodes_str("SDLG").build();
    let input = account_input(account, vec![(closed_fund, HoldingBuilder::value(2_500.0).build())]);

    let result = engine.rebalance_portfolio(&portfolio, &[input]);
    let account_result = &result.accounts[0];
    assert_eq!(account_result.proposed_values[&TickerSymbol::new("CLOSED")], 2_500.0);
}

#[test]
fn single_security_debt_holding_passes_through_with_negative_value() {
    let tree = CategoryTree::standard();
    let config = EngineConfig::default();
    let engine = Engine::new(&tree, &config, date(2025, 1, 1));

    let portfolio = PortfolioBuilder::new(1).level1_weights(0.0, 0.0, 100.0, 0.0).build();
    let account = AccountBuilder::new(1, 1, 1).build();
    let margin_debt = TickerBuilder::single_security("MARGIN").build();
    let cash = TickerBuilder::fund_rebalanceable("VMFXX").subcodes_str("CU").build();
    let input = account_input(
        account,
        vec![
            (margin_debt, HoldingBuilder::value(-500.0).build()),
            (cash, HoldingBuilder::value(10_000.0).build()),
        ],
    );

    let result = engine.rebalance_portfolio(&portfolio, &[input]);
    let account_result = &result.accounts[0];
    assert_eq!(account_result.proposed_values[&TickerSymbol::new("MARGIN")], -500.0);
    assert!((account_result.proposed_values[&TickerSymbol::new("VMFXX")] - 10_000.0).abs() < 1e-6);
}
