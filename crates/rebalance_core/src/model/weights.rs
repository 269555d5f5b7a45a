//! The overlay chain producing effective per-node weights for one account
//! (spec §4.2).

use rustc_hash::FxHashMap;

use crate::config::EngineConfig;
use crate::error::Diagnostic;
use crate::market;
use crate::model::account::{Account, DetailOverride};
use crate::model::category_tree::CategoryTree;
use crate::model::ids::CategoryId;
use crate::model::portfolio::{Level1Weights, Portfolio};

/// Effective weight for every node, for the account currently being
/// rebalanced. Built fresh per account and discarded at the end of its
/// rebalance (spec §3 "Lifecycles").
#[derive(Debug, Clone)]
pub struct WeightTable {
    effective: FxHashMap<CategoryId, f64>,
}

impl WeightTable {
    /// Overlay #1: built-in defaults, copied from the tree itself.
    pub fn defaults(tree: &CategoryTree) -> Self {
        let mut effective = FxHashMap::default();
        for i in 0..tree.len() {
            let id = CategoryId(i as u16);
            effective.insert(id, tree.node(id).default_weight);
        }
        WeightTable { effective }
    }

    pub fn get(&self, id: CategoryId) -> f64 {
        self.effective.get(&id).copied().unwrap_or(0.0)
    }

    pub fn set(&mut self, id: CategoryId, weight: f64) {
        self.effective.insert(id, weight);
    }

    /// Sum of the positive weights among `children`, for splitting a
    /// currency amount proportionally (spec §4.4).
    pub fn positive_weight_sum(&self, children: &[CategoryId]) -> f64 {
        children
            .iter()
            .map(|&id| self.get(id))
            .filter(|&w| w > 0.0)
            .sum()
    }
}

/// Overlay #2: replace the four level-1 weights with the account's own.
pub fn apply_level1_overlay(table: &mut WeightTable, tree: &CategoryTree, weights: &Level1Weights) {
    let ids = tree.level1();
    table.set(ids.stock, weights.stock);
    table.set(ids.bond, weights.bond);
    table.set(ids.cash, weights.cash);
    table.set(ids.real_estate, weights.real_estate);
}

/// Overlay #3: the fine-grained detail override replaces *every* weight
/// named in it. Unknown node names become a diagnostic and are skipped
/// rather than aborting the account.
pub fn apply_detail_overlay(
    table: &mut WeightTable,
    tree: &CategoryTree,
    detail: &DetailOverride,
    account: &Account,
    diagnostics: &mut Vec<Diagnostic>,
) {
    for (name, weight) in &detail.weights {
        match tree.find_by_name(name) {
            Some(id) => table.set(id, *weight),
            None => diagnostics.push(Diagnostic::account(
                account.key,
                crate::error::DiagnosticKind::InconsistentSubcodes,
                format!("detail override references unknown category '{name}'"),
            )),
        }
    }
}

/// Overlay #4: today-vs-last-close equity adjustment, multiplying the
/// stock level-1 weight by `today / last_close`. Active only when both
/// values are present in the engine config.
pub fn apply_close_adjustment(table: &mut WeightTable, tree: &CategoryTree, config: &EngineConfig) {
    if let (Some(today), Some(last_close)) = (config.sp_today, config.sp_close) {
        if last_close > 0.0 {
            let ids = tree.level1();
            let stock = table.get(ids.stock);
            table.set(ids.stock, stock * (today / last_close));
        }
    }
}

/// Overlay #5: today-vs-high hyperbolic equity adjustment (spec §4.3).
/// Active only when the portfolio's `increase_at_zero` and the config's
/// `sp_high`/`sp_today` are all present.
pub fn apply_high_adjustment(
    table: &mut WeightTable,
    tree: &CategoryTree,
    config: &EngineConfig,
    portfolio: &Portfolio,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let (Some(today), Some(high), Some(increase_at_zero)) =
        (config.sp_today, config.sp_high, portfolio.increase_at_zero)
    else {
        return;
    };
    let increase_at_bear = portfolio.effective_increase_at_bear().unwrap_or(increase_at_zero / 2.0);

    if increase_at_bear <= increase_at_zero / 5.0 {
        diagnostics.push(Diagnostic::portfolio(
            crate::error::DiagnosticKind::NonMonotoneCurve,
            "increase_at_bear is too small relative to increase_at_zero; the hyperbola is non-monotone"
                .to_string(),
        ));
    }

    let ids = tree.level1();
    let base_fraction = table.get(ids.stock) / 100.0;
    let target_fraction = market::hyperbolic_equity_target(
        high,
        base_fraction,
        base_fraction + increase_at_bear,
        base_fraction + increase_at_zero,
        today,
    );
    table.set(ids.stock, target_fraction * 100.0);
}
