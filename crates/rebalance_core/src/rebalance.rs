//! The recursive weight-proportional splitter (spec §4.4).
//!
//! Pushes one account's rebalanceable total down the category tree,
//! splitting by effective weight at every internal node, until it reaches
//! leaves where the ticker-set allocator (§4.5) takes over. A plain
//! function over `&CategoryTree` plus a `depth` parameter — no interior
//! mutability, no shared accumulator; each call returns its own residual
//! and writes into the caller-owned output map, the same threading style
//! `finplan_core::simulation` uses for `SimulationConfig`.

use rustc_hash::FxHashMap;

use crate::allocator::{LeafTicker, allocate_leaf};
use crate::config::EngineConfig;
use crate::error::{AllocationError, Diagnostic, DiagnosticKind};
use crate::model::ids::{AccountKey, CategoryId, TickerSymbol};
use crate::model::weights::WeightTable;
use crate::model::{CategoryTree, Level1Ids};

/// Tickers classified into the tree for one account, keyed by leaf (or, for
/// a ticker with no subcodes, the root or whatever ancestor its partial
/// subcodes resolved to).
pub type BoundTickers = FxHashMap<CategoryId, Vec<LeafTicker>>;

/// Marks, for every node in the tree, whether its subtree contains a bound
/// ticker able to "absorb arbitrary currency" — no minimum investment, no
/// rounding step. Computed once per account before distribution starts, so
/// residual bubbling (spec §4.4) can push toward such a ticker instead of
/// re-splitting blindly across dead branches. Tree nodes are built
/// parent-before-child (`Builder::push` assigns a node's id before any of
/// its children's), so a single reverse pass over node indices is enough to
/// compute this bottom-up without recursion.
fn absorbing_nodes(tree: &CategoryTree, bound: &BoundTickers) -> Vec<bool> {
    let mut can_absorb = vec![false; tree.len()];
    for i in (0..tree.len()).rev() {
        let id = CategoryId(i as u16);
        let node = tree.node(id);
        let direct_absorbs = bound
            .get(&id)
            .is_some_and(|tickers| tickers.iter().any(|t| t.min_investment <= 0.0 && t.preferred_rounding <= 0.0));
        can_absorb[i] = direct_absorbs || node.children.iter().any(|&c| can_absorb[c.0 as usize]);
    }
    can_absorb
}

/// Marks, for every node, whether its subtree holds a bound ticker anywhere
/// beneath it (or directly on it). A sibling leaf with a positive default
/// weight but no tickers at all — e.g. "Cash Government" when nothing is
/// classified into it — has nothing to receive money; letting it keep a
/// share of the split would strand that share as residual even though
/// tickered siblings could have absorbed it directly. The weight split in
/// [`distribute_at`] only ever considers children this marks `true`, so an
/// empty sibling's nominal weight is redistributed among the siblings that
/// actually hold something, the same bottom-up shape as [`absorbing_nodes`].
fn has_tickers(tree: &CategoryTree, bound: &BoundTickers) -> Vec<bool> {
    let mut present = vec![false; tree.len()];
    for i in (0..tree.len()).rev() {
        let id = CategoryId(i as u16);
        let node = tree.node(id);
        let direct = bound.get(&id).is_some_and(|tickers| !tickers.is_empty());
        present[i] = direct || node.children.iter().any(|&c| present[c.0 as usize]);
    }
    present
}

/// Distributes `amount` from `root` down the tree, returning the residual
/// that could not be placed anywhere (spec §4.4's "account-level
/// diagnostic" case when no absorbing ancestor exists). Per-ticker values
/// accumulate into `out` since a node with `mxrt`-permitted iterations may
/// contribute to the same leaf more than once.
#[allow(clippy::too_many_arguments)]
pub fn distribute(
    tree: &CategoryTree,
    bound: &BoundTickers,
    weights: &WeightTable,
    config: &EngineConfig,
    account: AccountKey,
    root: CategoryId,
    amount: f64,
    out: &mut FxHashMap<TickerSymbol, f64>,
    diagnostics: &mut Vec<Diagnostic>,
) -> f64 {
    let can_absorb = absorbing_nodes(tree, bound);
    let live = has_tickers(tree, bound);
    let residual = distribute_at(
        tree, bound, weights, config, account, root, amount, 0, &can_absorb, &live, out, diagnostics,
    );

    // One extra pass at the root: depth 0 is always unconstrained (spec
    // §4.4), so a residual bubbling all the way up still gets one more
    // attempt before the caller treats it as unplaceable.
    let residual = if residual.abs() > config.currency_epsilon {
        distribute_at(
            tree, bound, weights, config, account, root, residual, 0, &can_absorb, &live, out, diagnostics,
        )
    } else {
        residual
    };

    if residual.abs() > config.currency_epsilon {
        diagnostics.push(Diagnostic::account(
            account,
            DiagnosticKind::ResidualUnplaced,
            "residual reached the account root with no absorbing ticker anywhere in the tree",
        ));
    }

    residual
}

#[allow(clippy::too_many_arguments)]
fn distribute_at(
    tree: &CategoryTree,
    bound: &BoundTickers,
    weights: &WeightTable,
    config: &EngineConfig,
    account: AccountKey,
    node: CategoryId,
    amount: f64,
    depth: u16,
    can_absorb: &[bool],
    live: &[bool],
    out: &mut FxHashMap<TickerSymbol, f64>,
    diagnostics: &mut Vec<Diagnostic>,
) -> f64 {
    if amount.abs() <= config.currency_epsilon {
        return 0.0;
    }

    let data = tree.node(node);
    let direct: &[LeafTicker] = bound.get(&node).map(Vec::as_slice).unwrap_or(&[]);

    if data.is_leaf() {
        return allocate_and_record(direct, amount, config, account, out, diagnostics);
    }

    let live_children: Vec<CategoryId> = data.children.iter().copied().filter(|&c| live[c.0 as usize]).collect();
    let children_weight_sum = weights.positive_weight_sum(&live_children);
    let direct_weight: f64 = direct.iter().map(|t| t.holding_weight).sum();
    let total_weight = children_weight_sum + direct_weight;
    let direct_can_absorb =
        direct.iter().any(|t| t.min_investment <= 0.0 && t.preferred_rounding <= 0.0);

    if total_weight <= 0.0 {
        if !direct.is_empty() {
            return allocate_and_record(direct, amount, config, account, out, diagnostics);
        }
        return amount;
    }

    let mut residual = 0.0;
    for &child in &live_children {
        let w = weights.get(child);
        if w <= 0.0 {
            continue;
        }
        let share = amount * w / total_weight;
        residual += distribute_at(
            tree, bound, weights, config, account, child, share, depth + 1, can_absorb, live, out, diagnostics,
        );
    }
    if direct_weight > 0.0 {
        let share = amount * direct_weight / total_weight;
        residual += allocate_and_record(direct, share, config, account, out, diagnostics);
    }

    // Residual handling (spec §4.4): push whatever didn't place back
    // toward whichever of this node's children (or its own direct
    // tickers) can actually absorb arbitrary currency, rather than
    // re-splitting blindly across dead branches again. Gated by the
    // `mxrt` depth budget, same as the legacy retry it replaces.
    if residual.abs() > config.currency_epsilon && depth <= config.mxrt {
        let absorbing_weight: f64 = data
            .children
            .iter()
            .filter(|&&c| weights.get(c) > 0.0 && can_absorb[c.0 as usize])
            .map(|&c| weights.get(c))
            .sum::<f64>()
            + if direct_can_absorb { direct_weight } else { 0.0 };

        if absorbing_weight > 0.0 {
            let mut retry_residual = 0.0;
            for &child in &data.children {
                let w = weights.get(child);
                if w <= 0.0 || !can_absorb[child.0 as usize] {
                    continue;
                }
                let share = residual * w / absorbing_weight;
                retry_residual += distribute_at(
                    tree, bound, weights, config, account, child, share, depth + 1, can_absorb, live, out,
                    diagnostics,
                );
            }
            if direct_can_absorb {
                let share = residual * direct_weight / absorbing_weight;
                retry_residual += allocate_and_record(direct, share, config, account, out, diagnostics);
            }
            residual = retry_residual;
        }
        // Otherwise nothing reachable from here can absorb it; bubble the
        // whole amount up unchanged for the parent (or an ancestor
        // further up) to try.
    }

    residual
}

fn allocate_and_record(
    direct: &[LeafTicker],
    amount: f64,
    config: &EngineConfig,
    account: AccountKey,
    out: &mut FxHashMap<TickerSymbol, f64>,
    diagnostics: &mut Vec<Diagnostic>,
) -> f64 {
    if direct.is_empty() {
        return amount;
    }

    match allocate_leaf(direct, amount, config) {
        Ok(allocation) => {
            for (symbol, value) in allocation.values {
                *out.entry(symbol).or_insert(0.0) += value;
            }
            if allocation.budget_exhausted {
                diagnostics.push(Diagnostic::account(
                    account,
                    DiagnosticKind::BudgetExhausted,
                    "subset search cap (ncnt) exhausted before a zero-residual candidate was found",
                ));
            }
            allocation.residual
        }
        Err(AllocationError::UnallocableLeaf) => {
            diagnostics.push(Diagnostic::account(
                account,
                DiagnosticKind::UnallocableLeaf,
                "every ticker at this leaf was excluded by holding-weight or minimum investment",
            ));
            amount
        }
    }
}

/// Rolls the per-ticker values of one account's rebalance up into per
/// level-1-category totals, for the closure pass (spec §4.6). Tickers
/// whose leaf could not be resolved to a level-1 ancestor (only the root
/// itself) are skipped.
pub fn roll_up_level1(
    tree: &CategoryTree,
    bound: &BoundTickers,
    level1: Level1Ids,
    values: &FxHashMap<TickerSymbol, f64>,
) -> crate::model::Level1Weights {
    let mut totals = crate::model::Level1Weights {
        stock: 0.0,
        bond: 0.0,
        cash: 0.0,
        real_estate: 0.0,
    };

    let mut symbol_leaf: FxHashMap<&TickerSymbol, CategoryId> = FxHashMap::default();
    for (&leaf, tickers) in bound {
        for t in tickers {
            symbol_leaf.insert(&t.symbol, leaf);
        }
    }

    for (symbol, &value) in values {
        let Some(&leaf) = symbol_leaf.get(symbol) else {
            continue;
        };
        match tree.level1_ancestor(leaf, level1) {
            Some(id) if id == level1.stock => totals.stock += value,
            Some(id) if id == level1.bond => totals.bond += value,
            Some(id) if id == level1.cash => totals.cash += value,
            Some(id) if id == level1.real_estate => totals.real_estate += value,
            _ => {}
        }
    }

    totals
}
