//! Integration coverage for the closure pass (spec §4.6) threaded through
//! multi-account portfolios via [`crate::engine::Engine`]. Direct
//! reconciliation-math unit tests live in [`crate::closure`].

use jiff::civil::date;

use crate::builder::{AccountBuilder, HoldingBuilder, PortfolioBuilder, TickerBuilder};
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::error::DiagnosticKind;
use crate::model::ids::TickerSymbol;
use crate::model::CategoryTree;
use crate::tests::account_input;

#[test]
fn three_account_portfolio_reconciles_the_last_account_to_the_remaining_target() {
    let tree = CategoryTree::standard();
    let config = EngineConfig::default();
    let engine = Engine::new(&tree, &config, date(2025, 1, 1));

    // Portfolio targets 50/30/20 stock/bond/cash across three accounts; the
    // first two are entirely stock and bond respectively, leaving the last
    // account to absorb whatever's left of each category.
    let portfolio = PortfolioBuilder::new(1).level1_weights(50.0, 30.0, 20.0, 0.0).build();

    let first = AccountBuilder::new(1, 1, 1).order(0).level1_weights(100.0, 0.0, 0.0, 0.0).build();
    let stock = TickerBuilder::fund_rebalanceable("VTI").subcodes_str("SDLG").build();
    let first_input = account_input(first, vec![(stock, HoldingBuilder::value(5_000.0).build())]);

    let second = AccountBuilder::new(1, 2, 1).order(1).level1_weights(0.0, 100.0, 0.0, 0.0).build();
    let bond = TickerBuilder::fund_rebalanceable("BSV").subcodes_str("BT").build();
    let second_input = account_input(second, vec![(bond, HoldingBuilder::value(2_000.0).build())]);

    // 10,000 total portfolio value: already placed 5,000 stock + 2,000
    // bond; target is 5,000 / 3,000 / 2,000. The last account (3,000 of
    // cash-classified money) should be pushed entirely toward bond and
    // cash, having nothing left it's "supposed" to put into stock.
    let third = AccountBuilder::new(1, 3, 1).order(2).build();
    let bond2 = TickerBuilder::fund_rebalanceable("BSV2").subcodes_str("BT").build();
    let cash = TickerBuilder::fund_rebalanceable("VMFXX").subcodes_str("CU").build();
    let third_input = account_input(
        third,
        vec![
            (bond2, HoldingBuilder::value(1_000.0).build()),
            (cash, HoldingBuilder::value(2_000.0).build()),
        ],
    );

    let result = engine.rebalance_portfolio(&portfolio, &[first_input, second_input, third_input]);
    let last = &result.accounts[2];

    let bond2_value = last.proposed_values[&TickerSymbol::new("BSV2")];
    let cash_value = last.proposed_values[&TickerSymbol::new("VMFXX")];
    // Remaining targets: bond 1,000 (3,000 - 2,000), cash 2,000 (2,000 - 0).
    assert!((bond2_value - 1_000.0).abs() < 1e-6, "bond2={bond2_value}");
    assert!((cash_value - 2_000.0).abs() < 1e-6, "cash={cash_value}");
}

#[test]
fn overshooting_the_portfolio_target_is_diagnosed_on_the_last_account() {
    let tree = CategoryTree::standard();
    let config = EngineConfig::default();
    let engine = Engine::new(&tree, &config, date(2025, 1, 1));

    let portfolio = PortfolioBuilder::new(1).level1_weights(50.0, 50.0, 0.0, 0.0).build();

    // First account puts everything into stock, overshooting the
    // portfolio's 50% stock target outright (it's 100% of the portfolio's
    // total value).
    let first = AccountBuilder::new(1, 1, 1).order(0).level1_weights(100.0, 0.0, 0.0, 0.0).build();
    let stock = TickerBuilder::fund_rebalanceable("VTI").subcodes_str("SDLG").build();
    let first_input = account_input(first, vec![(stock, HoldingBuilder::value(10_000.0).build())]);

    let last = AccountBuilder::new(1, 2, 1).order(1).build();
    let bond = TickerBuilder::fund_rebalanceable("BSV").subcodes_str("BT").build();
    let last_input = account_input(last, vec![(bond, HoldingBuilder::value(1_000.0).build())]);

    let result = engine.rebalance_portfolio(&portfolio, &[first_input, last_input]);
    let last_result = &result.accounts[1];
    assert!(
        last_result
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::PortfolioOvershoot)
    );
    // The overshot stock target forces stock weight to zero on the last
    // account, so its whole (remaining) allocation goes to bond.
    assert!((last_result.proposed_values[&TickerSymbol::new("BSV")] - 1_000.0).abs() < 1e-6);
}
