//! Top-level orchestration (spec §2): classifies an account's holdings,
//! resolves its effective weights, runs the recursive splitter and leaf
//! allocator, and — for the last account in a portfolio — applies the
//! closure pass first. `Engine` borrows its `CategoryTree` and
//! `EngineConfig` and owns no mutable state between calls, so
//! `rebalance_portfolio` is safe to call concurrently across independent
//! portfolios (spec §5), mirroring the `simulate`/`simulate_with_scratch`
//! split `finplan_core::simulation` uses to let `optimization` fan
//! simulations out across threads.

use jiff::civil::Date;
use rustc_hash::FxHashMap;

use crate::allocator::LeafTicker;
use crate::closure::closure_weights;
use crate::config::EngineConfig;
use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::account::Account;
use crate::model::holding::Holding;
use crate::model::ids::{AccountKey, TickerSymbol};
use crate::model::portfolio::{Level1Weights, Portfolio};
use crate::model::ticker::Ticker;
use crate::model::{CategoryTree, weights};
use crate::rebalance::{self, BoundTickers};
use crate::synthesizer;

/// Coarse-grained outcome of one account's rebalance (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Ok,
    Partial,
    Infeasible,
}

#[derive(Debug, Clone)]
pub struct AccountResult {
    pub account: AccountKey,
    pub status: AccountStatus,
    pub proposed_values: FxHashMap<TickerSymbol, f64>,
    pub residual: f64,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct PortfolioResult {
    pub accounts: Vec<AccountResult>,
    pub diagnostics: Vec<Diagnostic>,
}

/// One account's inputs for a portfolio rebalance run: the account itself,
/// the definitions of every ticker it might hold, and its current
/// holdings. An account with no holdings and a synthesizer is treated as a
/// notional, ticker-less balance (annuity/Social-Security/averaged value);
/// everything else requires at least one holding.
#[derive(Debug, Clone)]
pub struct AccountInput {
    pub account: Account,
    pub tickers: FxHashMap<TickerSymbol, Ticker>,
    pub holdings: FxHashMap<TickerSymbol, Holding>,
}

/// Borrows the immutable category taxonomy and tuning parameters for one
/// engine run. Stateless between calls.
pub struct Engine<'a> {
    pub tree: &'a CategoryTree,
    pub config: &'a EngineConfig,
    pub now: Date,
}

impl<'a> Engine<'a> {
    pub fn new(tree: &'a CategoryTree, config: &'a EngineConfig, now: Date) -> Self {
        Engine { tree, config, now }
    }

    /// Rebalances every account in `inputs`, in ascending `rebalance_order`
    /// (spec §2), applying the closure pass to the last one.
    pub fn rebalance_portfolio(&self, portfolio: &Portfolio, inputs: &[AccountInput]) -> PortfolioResult {
        let mut diagnostics = Vec::new();
        let mut account_values: FxHashMap<AccountKey, f64> = FxHashMap::default();

        // Prepass: every account's current total value is known up front
        // (synthesized or summed from holdings) independent of how its
        // composition gets rebalanced, so the portfolio-wide balanceable
        // total the closure pass needs can be computed before any account
        // is actually rebalanced.
        let mut ordered: Vec<&AccountInput> = inputs.iter().collect();
        ordered.sort_by_key(|i| i.account.rebalance_order);

        for input in &ordered {
            let value = if input.holdings.is_empty() {
                synthesizer::synthesize_value(
                    &input.account,
                    portfolio,
                    self.config.inflation,
                    self.now,
                    &account_values,
                    &mut diagnostics,
                )
                .unwrap_or(0.0)
            } else {
                input.holdings.values().map(Holding::value).sum()
            };
            account_values.insert(input.account.key, value);
        }
        let portfolio_balanceable_value: f64 = account_values.values().sum();

        let mut already_placed = Level1Weights {
            stock: 0.0,
            bond: 0.0,
            cash: 0.0,
            real_estate: 0.0,
        };
        let mut results = Vec::with_capacity(ordered.len());

        for (idx, input) in ordered.iter().enumerate() {
            let is_last = idx + 1 == ordered.len();

            if input.holdings.is_empty() {
                // Notional account (synthesized balance, no tickers):
                // contributes to the running category totals per its own
                // declared level-1 weights, but has nothing to allocate.
                let value = account_values[&input.account.key];
                let w = input.account.level1_weights;
                let sum = w.sum();
                if sum > 0.0 {
                    already_placed.stock += value * w.stock / sum;
                    already_placed.bond += value * w.bond / sum;
                    already_placed.cash += value * w.cash / sum;
                    already_placed.real_estate += value * w.real_estate / sum;
                }
                results.push(AccountResult {
                    account: input.account.key,
                    status: AccountStatus::Ok,
                    proposed_values: FxHashMap::default(),
                    residual: 0.0,
                    diagnostics: Vec::new(),
                });
                continue;
            }

            let (result, contribution) = self.rebalance_account(
                &input.account,
                portfolio,
                &input.tickers,
                &input.holdings,
                is_last,
                already_placed,
                portfolio_balanceable_value,
            );
            already_placed.stock += contribution.stock;
            already_placed.bond += contribution.bond;
            already_placed.cash += contribution.cash;
            already_placed.real_estate += contribution.real_estate;
            results.push(result);
        }

        PortfolioResult {
            accounts: results,
            diagnostics,
        }
    }

    /// Rebalances one account: classifies its balanceable holdings,
    /// resolves effective weights (closure pass included when
    /// `is_last_account`), and runs the recursive splitter. Returns the
    /// account result plus this account's own contribution to the
    /// portfolio's level-1 category totals, for the caller to fold into
    /// `already_placed` before the next account.
    fn rebalance_account(
        &self,
        account: &Account,
        portfolio: &Portfolio,
        tickers: &FxHashMap<TickerSymbol, Ticker>,
        holdings: &FxHashMap<TickerSymbol, Holding>,
        is_last_account: bool,
        already_placed: Level1Weights,
        portfolio_balanceable_value: f64,
    ) -> (AccountResult, Level1Weights) {
        let mut diagnostics = Vec::new();
        let mut proposed: FxHashMap<TickerSymbol, f64> = FxHashMap::default();
        let mut bound: BoundTickers = FxHashMap::default();
        let mut rebalanceable_amount = 0.0;

        for (symbol, holding) in holdings {
            let Some(ticker) = tickers.get(symbol) else {
                diagnostics.push(Diagnostic::ticker(
                    account.key,
                    symbol.clone(),
                    DiagnosticKind::UnclassifiableTicker,
                    "no ticker definition found for this holding",
                ));
                proposed.insert(symbol.clone(), holding.value());
                continue;
            };

            if !ticker.kind.is_balanceable() {
                proposed.insert(symbol.clone(), holding.value());
                continue;
            }

            match self.tree.classify(&ticker.subcodes) {
                Ok(leaf) => {
                    rebalanceable_amount += holding.value();
                    bound.entry(leaf).or_default().push(LeafTicker {
                        symbol: symbol.clone(),
                        holding_weight: holding.holding_weight,
                        min_investment: ticker.min_investment,
                        preferred_rounding: ticker.preferred_rounding,
                        price: holding.price,
                    });
                }
                Err(_) => {
                    diagnostics.push(Diagnostic::ticker(
                        account.key,
                        symbol.clone(),
                        DiagnosticKind::InconsistentSubcodes,
                        "subcodes imply two incompatible category-tree branches; treated as non-rebalanceable",
                    ));
                    proposed.insert(symbol.clone(), holding.value());
                }
            }
        }

        let mut table = weights::WeightTable::defaults(self.tree);
        weights::apply_level1_overlay(&mut table, self.tree, &account.level1_weights);
        if let Some(detail) = &account.detail_override {
            weights::apply_detail_overlay(&mut table, self.tree, detail, account, &mut diagnostics);
        }
        weights::apply_close_adjustment(&mut table, self.tree, self.config);
        weights::apply_high_adjustment(&mut table, self.tree, self.config, portfolio, &mut diagnostics);

        if is_last_account {
            let (closed, mut closure_diagnostics) =
                closure_weights(portfolio, portfolio_balanceable_value, already_placed);
            weights::apply_level1_overlay(&mut table, self.tree, &closed);
            diagnostics.append(&mut closure_diagnostics);
        }

        let mut placed: FxHashMap<TickerSymbol, f64> = FxHashMap::default();
        let residual = rebalance::distribute(
            self.tree,
            &bound,
            &table,
            self.config,
            account.key,
            self.tree.root(),
            rebalanceable_amount,
            &mut placed,
            &mut diagnostics,
        );

        let contribution = rebalance::roll_up_level1(self.tree, &bound, self.tree.level1(), &placed);

        for (symbol, value) in &placed {
            proposed.insert(symbol.clone(), *value);
        }

        let status = if residual.abs() <= self.config.currency_epsilon {
            AccountStatus::Ok
        } else if rebalanceable_amount.abs() <= self.config.currency_epsilon
            || placed.values().any(|v| v.abs() > self.config.currency_epsilon)
        {
            AccountStatus::Partial
        } else {
            AccountStatus::Infeasible
        };

        (
            AccountResult {
                account: account.key,
                status,
                proposed_values: proposed,
                residual,
                diagnostics,
            },
            contribution,
        )
    }
}
