//! Scratch binary exercising the builder DSL end to end. Not a report
//! writer — just enough to eyeball a rebalance result by hand.

use jiff::civil::date;
use rebalance_core::builder::{AccountBuilder, HoldingBuilder, PortfolioBuilder, TickerBuilder};
use rebalance_core::config::EngineConfig;
use rebalance_core::model::CategoryTree;
use rebalance_core::{AccountInput, Engine};
use rustc_hash::FxHashMap;

fn main() {
    let tree = CategoryTree::standard();
    let config = EngineConfig::default();
    let engine = Engine::new(&tree, &config, date(2026, 1, 1));

    let portfolio = PortfolioBuilder::new(1)
        .level1_weights(60.0, 30.0, 10.0, 0.0)
        .build();

    let taxable = AccountBuilder::new(1, 1, 1).order(0).build();
    let vti = TickerBuilder::fund_rebalanceable("VTI").subcodes_str("SDLG").build();
    let bsv = TickerBuilder::fund_rebalanceable("BSV").subcodes_str("BT").build();
    let vmfxx = TickerBuilder::fund_rebalanceable("VMFXX").subcodes_str("CU").build();

    let mut tickers = FxHashMap::default();
    let mut holdings = FxHashMap::default();
    for (ticker, value) in [(vti, 40_000.0), (bsv, 20_000.0), (vmfxx, 5_000.0)] {
        let symbol = ticker.symbol.clone();
        tickers.insert(symbol.clone(), ticker);
        holdings.insert(symbol, HoldingBuilder::value(value).build());
    }

    let roth = AccountBuilder::new(1, 2, 1).order(1).build();
    let vti_roth = TickerBuilder::fund_rebalanceable("VTI").subcodes_str("SDLG").build();
    let mut roth_tickers = FxHashMap::default();
    let mut roth_holdings = FxHashMap::default();
    roth_tickers.insert(vti_roth.symbol.clone(), vti_roth.clone());
    roth_holdings.insert(vti_roth.symbol.clone(), HoldingBuilder::value(15_000.0).build());

    let inputs = vec![
        AccountInput {
            account: taxable,
            tickers,
            holdings,
        },
        AccountInput {
            account: roth,
            tickers: roth_tickers,
            holdings: roth_holdings,
        },
    ];

    let result = engine.rebalance_portfolio(&portfolio, &inputs);
    for account in &result.accounts {
        println!("account {:?}: {:?}", account.account, account.status);
        for (symbol, value) in &account.proposed_values {
            println!("  {symbol:?} -> {value:.2}");
        }
        for diagnostic in &account.diagnostics {
            println!("  diagnostic: {diagnostic:?}");
        }
    }
}
