//! The closure pass (spec §4.6): a portfolio-level reconciliation run on
//! the last account, implemented as overlay #6 on top of the five overlays
//! in [`crate::model::weights`] — it produces a replacement level-1
//! `Level1Weights` for the account being finalized, the same shape as the
//! other overlay passes.

use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::{Level1Weights, Portfolio};

/// Applies spec §4.6's per-category reconciliation. `already_placed` is the
/// sum, across every earlier account in the portfolio, of proposed values
/// that landed in each level-1 category (see
/// [`crate::rebalance::roll_up_level1`]). `portfolio_balanceable_value` is
/// the sum of every account's rebalanceable value in the portfolio
/// (spec §4.6's `portfolio_balanceable_value`).
///
/// Returns the level-1 weights the last account should use in place of its
/// own, plus diagnostics for any category whose portfolio-level target was
/// already overshot by earlier accounts.
pub fn closure_weights(
    portfolio: &Portfolio,
    portfolio_balanceable_value: f64,
    already_placed: Level1Weights,
) -> (Level1Weights, Vec<Diagnostic>) {
    let weight_sum = portfolio.level1_weights.sum();
    if weight_sum <= 0.0 {
        // Spec §9 open question (b): when every portfolio-level weight is
        // zero there is nothing to reconcile toward; rely on this
        // account's own holding-weights instead of forcing an override.
        return (portfolio.level1_weights, Vec::new());
    }

    let mut diagnostics = Vec::new();
    let category = |name: &str, target_weight: f64, placed: f64| -> f64 {
        let target = portfolio_balanceable_value * target_weight / weight_sum;
        let residual = target - placed;
        if residual < 0.0 {
            diagnostics.push(Diagnostic::portfolio(
                DiagnosticKind::PortfolioOvershoot,
                format!("portfolio-level target for {name} was already overshot by {:.2}", -residual),
            ));
            0.0
        } else {
            residual
        }
    };

    let stock = category("stock", portfolio.level1_weights.stock, already_placed.stock);
    let bond = category("bond", portfolio.level1_weights.bond, already_placed.bond);
    let cash = category("cash", portfolio.level1_weights.cash, already_placed.cash);
    let real_estate = category(
        "real-estate",
        portfolio.level1_weights.real_estate,
        already_placed.real_estate,
    );

    (
        Level1Weights {
            stock,
            bond,
            cash,
            real_estate,
        },
        diagnostics,
    )
}
