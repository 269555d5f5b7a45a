//! Leaf-level ticker subset allocator (spec §4.5) — the algorithmic centre
//! of the engine.
//!
//! Given a currency amount and the tickers bound to one leaf, this searches
//! subsets of the ticker set for the allocation that hits zero residual (or,
//! failing that, minimum residual) with minimum deviation from the ideal
//! weight-proportional split, honouring each ticker's minimum investment and
//! preferred rounding. The `2^n - 1` subset space is walked as bitmasks
//! rather than a materialized power set, bounded by `EngineConfig::ncnt`.

use crate::config::EngineConfig;
use crate::error::AllocationError;
use crate::model::ids::TickerSymbol;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// One ticker as seen by the allocator: the fields of
/// [`crate::model::Ticker`] plus the holding's current price and
/// holding-weight, already filtered to this leaf and this account.
#[derive(Debug, Clone)]
pub struct LeafTicker {
    pub symbol: TickerSymbol,
    pub holding_weight: f64,
    pub min_investment: f64,
    pub preferred_rounding: f64,
    pub price: f64,
}

/// Result of allocating one currency amount across one leaf's tickers.
#[derive(Debug, Clone)]
pub struct LeafAllocation {
    pub values: Vec<(TickerSymbol, f64)>,
    pub residual: f64,
    /// `ncnt` was exhausted before a zero-residual candidate was found;
    /// the returned allocation is still the best-seen.
    pub budget_exhausted: bool,
}

/// A fully-evaluated subset candidate (spec §4.5 acceptance rule).
#[derive(Debug, Clone)]
struct Candidate {
    residual: f64,
    deviation_sq: f64,
    size: usize,
    /// Sorted ticker symbols in the subset, for the lexicographic tie-break.
    symbols_sorted: Vec<String>,
    /// Per-eligible-ticker proposed value, zero for tickers outside the
    /// subset.
    values: Vec<f64>,
}

/// Nearest feasible value for one ticker given its pre-snap ideal share:
/// rounds to the nearest multiple of `rounding` (in shares) if rounding is
/// active, then enforces "zero or |v| >= |min_investment|" by choosing
/// whichever of zero or the nearest feasible non-zero multiple is closer to
/// the un-rounded ideal.
fn snap(ideal: f64, min_investment: f64, rounding: f64, price: f64) -> f64 {
    let min_abs = min_investment.abs();

    if rounding > 0.0 && price > 0.0 {
        let raw_shares = ideal / price;
        let nearest_shares = (raw_shares / rounding).round() * rounding;
        let nearest_value = nearest_shares * price;

        if nearest_value.abs() >= min_abs || min_abs == 0.0 {
            return nearest_value;
        }

        let sign = if ideal < 0.0 { -1.0 } else { 1.0 };
        let min_shares = (min_abs / price / rounding).ceil() * rounding;
        let feasible_min = sign * min_shares * price;

        if (ideal - 0.0).abs() <= (ideal - feasible_min).abs() {
            0.0
        } else {
            feasible_min
        }
    } else if ideal.abs() < min_abs {
        0.0
    } else {
        ideal
    }
}

/// Evaluates one subset: tickers with a preferred rounding step ("rounded")
/// snap first, aiming at their full proportional share of `amount` as if the
/// rounding-free ("free") members in the subset didn't compete for it at
/// all. Whatever the rounded members' snapping leaves over is then what the
/// free members split among themselves; a rounded member alone in its subset
/// always gets the whole amount pre-snap, and a lone free member absorbs
/// exactly the leftover. This is the only way a subset with both kinds of
/// ticker ever reaches zero residual.
fn evaluate_subset(mask: u32, eligible: &[LeafTicker], ideal_full: &[f64], amount: f64) -> Candidate {
    let n = eligible.len();
    let members: Vec<usize> = (0..n).filter(|&i| mask & (1 << i) != 0).collect();
    let (rounded, free): (Vec<usize>, Vec<usize>) =
        members.iter().copied().partition(|&i| eligible[i].preferred_rounding > 0.0);

    let mut values = vec![0.0; n];

    let rounded_weight_sum: f64 = rounded.iter().map(|&i| eligible[i].holding_weight).sum();
    let mut rounded_sum = 0.0;
    for &i in &rounded {
        let t = &eligible[i];
        let local_ideal = if rounded_weight_sum > 0.0 {
            amount * t.holding_weight / rounded_weight_sum
        } else {
            0.0
        };
        let v = snap(local_ideal, t.min_investment, t.preferred_rounding, t.price);
        values[i] = v;
        rounded_sum += v;
    }

    let remaining = amount - rounded_sum;
    let free_weight_sum: f64 = free.iter().map(|&i| eligible[i].holding_weight).sum();
    for &i in &free {
        let t = &eligible[i];
        let local_ideal = if free_weight_sum > 0.0 {
            remaining * t.holding_weight / free_weight_sum
        } else {
            0.0
        };
        values[i] = snap(local_ideal, t.min_investment, t.preferred_rounding, t.price);
    }

    let placed: f64 = values.iter().sum();
    let residual = amount - placed;
    let deviation_sq: f64 = (0..n)
        .map(|i| eligible[i].holding_weight * (values[i] - ideal_full[i]).powi(2))
        .sum();

    let mut symbols_sorted: Vec<String> = members.iter().map(|&i| eligible[i].symbol.0.clone()).collect();
    symbols_sorted.sort();

    Candidate {
        residual,
        deviation_sq,
        size: members.len(),
        symbols_sorted,
        values,
    }
}

/// Acceptance rule from spec §4.5: prefer zero residual, then minimum
/// deviation²; otherwise minimum |residual|, then deviation², then
/// smallest subset, then lexicographic symbol order. Total order, so safe
/// to fold over candidates in any evaluation order (spec §5 determinism).
fn pick_better(a: Candidate, b: Candidate, epsilon: f64) -> Candidate {
    let a_zero = a.residual.abs() <= epsilon;
    let b_zero = b.residual.abs() <= epsilon;

    match (a_zero, b_zero) {
        (true, false) => a,
        (false, true) => b,
        _ => {
            if !a_zero {
                let diff = a.residual.abs() - b.residual.abs();
                if diff < -1e-9 {
                    return a;
                } else if diff > 1e-9 {
                    return b;
                }
            }
            let dev_diff = a.deviation_sq - b.deviation_sq;
            if dev_diff < -1e-9 {
                a
            } else if dev_diff > 1e-9 {
                b
            } else if a.size != b.size {
                if a.size < b.size { a } else { b }
            } else if a.symbols_sorted <= b.symbols_sorted {
                a
            } else {
                b
            }
        }
    }
}

/// Allocates `amount` across `tickers` per spec §4.5. Tickers withheld via
/// zero holding-weight are excluded from the search and reported at zero.
/// Returns [`AllocationError::UnallocableLeaf`] only when no ticker is
/// eligible at all (the usual case of min-investment ruling out every
/// candidate surfaces as a non-zero `residual` on a returned allocation,
/// not an error — the caller pushes that residual upward).
pub fn allocate_leaf(
    tickers: &[LeafTicker],
    amount: f64,
    config: &EngineConfig,
) -> Result<LeafAllocation, AllocationError> {
    let withheld: Vec<&LeafTicker> = tickers.iter().filter(|t| t.holding_weight <= 0.0).collect();
    let eligible: Vec<LeafTicker> = tickers
        .iter()
        .filter(|t| t.holding_weight > 0.0)
        .cloned()
        .collect();

    if eligible.is_empty() {
        return Err(AllocationError::UnallocableLeaf);
    }

    if amount.abs() <= config.currency_epsilon {
        let mut values: Vec<(TickerSymbol, f64)> =
            eligible.iter().map(|t| (t.symbol.clone(), 0.0)).collect();
        values.extend(withheld.iter().map(|t| (t.symbol.clone(), 0.0)));
        return Ok(LeafAllocation {
            values,
            residual: amount,
            budget_exhausted: false,
        });
    }

    let n = eligible.len();
    assert!(
        n <= 24,
        "leaf ticker-set subset search assumes at most 24 tickers per leaf"
    );

    let total_h: f64 = eligible.iter().map(|t| t.holding_weight).sum();
    let ideal_full: Vec<f64> = eligible
        .iter()
        .map(|t| {
            if total_h > 0.0 {
                amount * t.holding_weight / total_h
            } else {
                0.0
            }
        })
        .collect();

    let total_subsets = (1u64 << n) - 1;
    let (best, budget_exhausted) = search(&eligible, &ideal_full, amount, config, total_subsets);

    let mut values: Vec<(TickerSymbol, f64)> = eligible
        .iter()
        .zip(best.values.iter())
        .map(|(t, &v)| (t.symbol.clone(), round_currency(v, config)))
        .collect();
    values.extend(withheld.iter().map(|t| (t.symbol.clone(), 0.0)));

    Ok(LeafAllocation {
        values,
        residual: best.residual,
        budget_exhausted,
    })
}

#[cfg(not(feature = "parallel"))]
fn search(
    eligible: &[LeafTicker],
    ideal_full: &[f64],
    amount: f64,
    config: &EngineConfig,
    total_subsets: u64,
) -> (Candidate, bool) {
    let mut best: Option<Candidate> = None;
    let mut examined: u64 = 0;
    let mut zero_found = false;
    let mut restrict_small = false;
    let mut budget_exhausted = false;

    for mask in 1u64..=total_subsets {
        if restrict_small && mask.count_ones() > 2 {
            continue;
        }

        let cand = evaluate_subset(mask as u32, eligible, ideal_full, amount);
        examined += 1;
        if cand.residual.abs() <= config.currency_epsilon {
            zero_found = true;
        }

        best = Some(match best {
            None => cand,
            Some(b) => pick_better(b, cand, config.currency_epsilon),
        });

        if examined >= config.ncnt as u64 {
            budget_exhausted = true;
            if zero_found {
                break;
            }
            restrict_small = true;
        }
    }

    (best.expect("at least one subset is always evaluated"), budget_exhausted && !zero_found)
}

/// With the `parallel` feature, candidate subsets are evaluated with
/// `rayon` instead of a sequential loop. The reduction still applies
/// [`pick_better`]'s total order, so enabling/disabling this feature never
/// changes the chosen candidate (spec §5 reproducibility).
#[cfg(feature = "parallel")]
fn search(
    eligible: &[LeafTicker],
    ideal_full: &[f64],
    amount: f64,
    config: &EngineConfig,
    total_subsets: u64,
) -> (Candidate, bool) {
    let first_pass = (config.ncnt as u64).min(total_subsets);
    let epsilon = config.currency_epsilon;

    let first_best = (1u64..=first_pass)
        .into_par_iter()
        .map(|mask| evaluate_subset(mask as u32, eligible, ideal_full, amount))
        .reduce_with(|a, b| pick_better(a, b, epsilon))
        .expect("first pass always has at least one mask");

    let zero_found = first_best.residual.abs() <= epsilon;
    if zero_found || first_pass == total_subsets {
        return (first_best, !zero_found && first_pass < total_subsets);
    }

    let remainder_best = ((first_pass + 1)..=total_subsets)
        .into_par_iter()
        .filter(|mask| mask.count_ones() <= 2)
        .map(|mask| evaluate_subset(mask as u32, eligible, ideal_full, amount))
        .reduce_with(|a, b| pick_better(a, b, epsilon));

    match remainder_best {
        Some(cand) => (pick_better(first_best, cand, epsilon), true),
        None => (first_best, true),
    }
}

/// Banker's rounding (round-half-to-even) to the currency's minor unit
/// (spec §9 "floating-point determinism").
fn round_currency(value: f64, config: &EngineConfig) -> f64 {
    let unit = config.currency_epsilon;
    if unit <= 0.0 {
        return value;
    }
    let scaled = value / unit;
    round_half_even(scaled) * unit
}

fn round_half_even(x: f64) -> f64 {
    let floor = x.floor();
    let diff = x - floor;
    if diff < 0.5 {
        floor
    } else if diff > 0.5 {
        floor + 1.0
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    }
}
