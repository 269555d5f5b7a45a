//! Integration coverage for the hyperbolic equity-target adjuster (spec
//! §4.3) threaded through the weight resolver and [`crate::engine::Engine`].
//! The curve-fit math itself is unit-tested directly in [`crate::market`].

use jiff::civil::date;

use crate::builder::{AccountBuilder, HoldingBuilder, PortfolioBuilder, TickerBuilder};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::DiagnosticKind;
use crate::model::ids::TickerSymbol;
use crate::model::CategoryTree;
use crate::tests::account_input;

#[test]
fn near_the_market_high_the_adjustment_leaves_the_target_close_to_unadjusted() {
    let tree = CategoryTree::standard();
    let config = EngineConfig::default().with_sp(4_990.0, None, Some(5_000.0));
    let engine = Engine::new(&tree, &config, date(2025, 1, 1));

    let portfolio = PortfolioBuilder::new(1)
        .level1_weights(60.0, 40.0, 0.0, 0.0)
        .increase_at_zero(0.20)
        .build();
    // Two-account portfolio so the (non-last) account actually carries the
    // high-adjusted weight instead of being overwritten by closure.
    let first = AccountBuilder::new(1, 1, 1).order(0).level1_weights(100.0, 0.0, 0.0, 0.0).build();
    let last = AccountBuilder::new(1, 2, 1).order(1).build();

    let stock = TickerBuilder::fund_rebalanceable("VTI").subcodes_str("SDLG").build();
    let cash = TickerBuilder::fund_rebalanceable("VMFXX").subcodes_str("CU").build();

    let first_input = account_input(first, vec![(stock, HoldingBuilder::value(10_000.0).build())]);
    let last_input = account_input(last, vec![(cash, HoldingBuilder::value(1_000.0).build())]);

    let result = engine.rebalance_portfolio(&portfolio, &[first_input, last_input]);
    let first_result = &result.accounts[0];
    // A single fully-weighted leaf still absorbs the whole account
    // regardless of the exact adjusted fraction, since there's nowhere
    // else for the money to go.
    assert!((first_result.proposed_values[&TickerSymbol::new("VTI")] - 10_000.0).abs() < 1e-6);
    assert!(first_result.diagnostics.iter().all(|d| d.kind != DiagnosticKind::NonMonotoneCurve));
}

#[test]
fn an_unreasonably_small_increase_at_bear_is_flagged_as_non_monotone() {
    let tree = CategoryTree::standard();
    let config = EngineConfig::default().with_sp(4_990.0, None, Some(5_000.0));
    let engine = Engine::new(&tree, &config, date(2025, 1, 1));

    let portfolio = PortfolioBuilder::new(1)
        .level1_weights(60.0, 40.0, 0.0, 0.0)
        .increase_at_zero(0.20)
        // increase_at_bear <= increase_at_zero / 5 trips the curve warning.
        .increase_at_bear(0.02)
        .build();
    let account = AccountBuilder::new(1, 1, 1).level1_weights(100.0, 0.0, 0.0, 0.0).build();
    let stock = TickerBuilder::fund_rebalanceable("VTI").subcodes_str("SDLG").build();
    let input = account_input(account, vec![(stock, HoldingBuilder::value(10_000.0).build())]);

    let result = engine.rebalance_portfolio(&portfolio, &[input]);
    let account_result = &result.accounts[0];
    assert!(
        account_result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::NonMonotoneCurve)
    );
}

#[test]
fn equity_adjustments_are_inactive_without_sp_today() {
    let tree = CategoryTree::standard();
    let config = EngineConfig::default(); // no sp_today, sp_close, sp_high
    let engine = Engine::new(&tree, &config, date(2025, 1, 1));

    let portfolio = PortfolioBuilder::new(1)
        .level1_weights(50.0, 50.0, 0.0, 0.0)
        .increase_at_zero(0.20)
        .build();
    let account = AccountBuilder::new(1, 1, 1).build();
    let stock = TickerBuilder::fund_rebalanceable("VTI").subcodes_str("SDLG").build();
    let bond = TickerBuilder::fund_rebalanceable("BSV").subcodes_str("BT").build();
    let input = account_input(
        account,
        vec![
            (stock, HoldingBuilder::value(5_000.0).build()),
            (bond, HoldingBuilder::value(5_000.0).build()),
        ],
    );

    let result = engine.rebalance_portfolio(&portfolio, &[input]);
    let account_result = &result.accounts[0];
    assert!((account_result.proposed_values[&TickerSymbol::new("VTI")] - 5_000.0).abs() < 1e-6);
    assert!((account_result.proposed_values[&TickerSymbol::new("BSV")] - 5_000.0).abs() < 1e-6);
}
