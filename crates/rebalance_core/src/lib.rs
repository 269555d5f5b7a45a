//! Portfolio rebalancing engine.
//!
//! Given one account's holdings, a fixed weight-type taxonomy, and a
//! declared set of per-account/per-portfolio target weights, this crate
//! computes a proposed reallocation that minimises deviation from those
//! targets while respecting per-ticker minimum investment and preferred
//! rounding. CSV parsing, persistent-preference storage, report writers,
//! and the historical-simulation harness are external collaborators; this
//! crate exposes plain Rust types and functions for them to call, the same
//! way `finplan_core` exposes `SimulationConfig`/`simulate` without owning
//! the TUI or HTTP layers that call it.
//!
//! # Builder DSL
//!
//! ```ignore
//! use rebalance_core::builder::{AccountBuilder, HoldingBuilder, PortfolioBuilder, TickerBuilder};
//! use rebalance_core::engine::{AccountInput, Engine};
//! use rebalance_core::config::EngineConfig;
//! use rebalance_core::model::CategoryTree;
//!
//! let portfolio = PortfolioBuilder::new(1).level1_weights(50.0, 36.0, 10.0, 4.0).build();
//! let account = AccountBuilder::new(1, 1, 1).level1_weights(100.0, 0.0, 0.0, 0.0).build();
//! let ticker = TickerBuilder::fund_rebalanceable("VMFXX").subcodes_str("CU").build();
//! let holding = HoldingBuilder::value(10_000.0).build();
//!
//! let tree = CategoryTree::standard();
//! let config = EngineConfig::default();
//! let engine = Engine::new(&tree, &config, jiff::civil::date(2025, 1, 1));
//! ```

#![warn(clippy::all)]

pub mod allocator;
pub mod builder;
pub mod closure;
pub mod config;
pub mod date_math;
pub mod engine;
pub mod error;
pub mod market;
pub mod model;
pub mod rebalance;
pub mod synthesizer;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use engine::{AccountInput, AccountResult, AccountStatus, Engine, PortfolioResult};
pub use error::{AllocationError, ClassificationError, Diagnostic, DiagnosticKind};
