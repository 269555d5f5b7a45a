//! Engine tuning parameters (spec §6), read once at engine construction and
//! threaded by shared reference thereafter — the same shape as
//! `finplan_core::config::SimulationConfig`.

use serde::{Deserialize, Serialize};

/// Immutable for the duration of one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Subset-search cap per leaf (spec §4.5).
    pub ncnt: u32,
    /// Depth cap for multi-iteration nodes (spec §4.4). The root is depth 0
    /// and is always unconstrained regardless of this value.
    pub mxrt: u16,
    /// Annual inflation rate, as a fraction (e.g. `0.03` for 3%), used by
    /// the no-CPI-annuity synthesiser (spec §4.7).
    pub inflation: f64,
    /// S&P value at the relevant all-time high, for the hyperbolic
    /// high-adjustment (spec §4.3).
    pub sp_high: Option<f64>,
    /// S&P value at the last close, for the close-vs-today adjustment
    /// (spec §4.2 overlay #4).
    pub sp_close: Option<f64>,
    /// S&P value today. Both equity adjustments are inactive unless this
    /// is set.
    pub sp_today: Option<f64>,
    /// One minor currency unit; residuals within this magnitude are
    /// treated as zero, and proposed values are rounded to it (spec §4.5,
    /// §4.6).
    pub currency_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            ncnt: 4096,
            mxrt: 2,
            inflation: 0.0,
            sp_high: None,
            sp_close: None,
            sp_today: None,
            currency_epsilon: 0.01,
        }
    }
}

impl EngineConfig {
    pub fn with_ncnt(mut self, ncnt: u32) -> Self {
        self.ncnt = ncnt;
        self
    }

    pub fn with_mxrt(mut self, mxrt: u16) -> Self {
        self.mxrt = mxrt;
        self
    }

    pub fn with_inflation(mut self, inflation: f64) -> Self {
        self.inflation = inflation;
        self
    }

    pub fn with_sp(mut self, today: f64, close: Option<f64>, high: Option<f64>) -> Self {
        self.sp_today = Some(today);
        self.sp_close = close;
        self.sp_high = high;
        self
    }
}
