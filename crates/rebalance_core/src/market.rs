//! The hyperbolic equity-target adjuster (spec §4.3).
//!
//! Free functions rather than a struct, mirroring `finplan_core::model::market`'s
//! `n_day_rate`/`apply_rates_to_value` style of treating market math as
//! stateless transforms over plain `f64`s.

/// Fits `y(x) = (H - y_high) / (s*(x - x_high) - 1) + H` through the three
/// anchor points `(x_high, y_high)`, `(0.8*x_high, y_bear)`, `(0, y_zero)`
/// and evaluates it at `x`.
///
/// `y_high` is the portfolio's unadjusted stock fraction (the curve passes
/// through it unchanged at the all-time high); `y_bear` and `y_zero` are
/// that same fraction plus `increase_at_bear`/`increase_at_zero`.
///
/// Returns `y_high` unchanged if `x_high` is zero or negative, since the
/// anchors collapse and the hyperbola is undefined.
pub fn hyperbolic_equity_target(x_high: f64, y_high: f64, y_bear: f64, y_zero: f64, x: f64) -> f64 {
    if x_high <= 0.0 {
        return y_high;
    }
    let x_bear = 0.8 * x_high;

    let a_z = (y_zero - y_high) / (0.0 - x_high);
    let a_b = (y_bear - y_high) / (x_bear - x_high);

    let denom = y_zero - y_bear;
    if denom.abs() < 1e-12 {
        return y_high;
    }
    let s = (a_z - a_b) / denom;
    if s.abs() < 1e-12 {
        return y_high;
    }
    let h = (y_zero * s - a_z) / s;

    (h - y_high) / (s * (x - x_high) - 1.0) + h
}
