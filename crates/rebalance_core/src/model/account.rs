//! Account definitions (spec §3).

use serde::{Deserialize, Serialize};

use crate::model::ids::{AccountKey, PortfolioId};
use crate::model::portfolio::Level1Weights;

/// How a leaf-level residual should be treated once the allocator has run.
/// `Percent` keeps proportional shares intact and spreads any residual by
/// weight; `Redistribute` (spec §4.4 residual handling) pushes an
/// unallocable remainder up to the nearest ancestor that can absorb it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RebalanceProcedure {
    Percent,
    Redistribute,
}

/// Fixed tax-type enum (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaxType {
    Credit,
    Hsa,
    InheritedIra,
    NonRothFourOhOneK,
    NonRothAnnuity,
    NonRothIra,
    Pension,
    RealEstate,
    RothFourOhOneK,
    RothAnnuity,
    RothIra,
    Taxable,
}

/// Which derivation the synthesiser (spec §4.7) applies when an account's
/// value is absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SynthesizerKind {
    Averaging,
    CpiAnnuity,
    Negation,
    NoCpiAnnuity,
    SocialSecurity,
}

/// Synthesiser configuration: which derivation to use, and (for Averaging
/// and Negation) the accounts it draws from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesizerConfig {
    pub kind: SynthesizerKind,
    pub referenced_accounts: Vec<AccountKey>,
}

/// A fine-grained weight override for one account, replacing *all* weights
/// at every tree level (spec §4.2 overlay #3). Resolved against node names
/// in [`crate::model::CategoryTree`] at apply time; an unknown name becomes
/// a validation diagnostic and is skipped rather than aborting the run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetailOverride {
    pub weights: Vec<(String, f64)>,
}

/// One account at one institution (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub key: AccountKey,
    pub portfolio_id: PortfolioId,
    /// Non-negative; accounts within a portfolio rebalance in this order.
    pub rebalance_order: u32,
    pub procedure: RebalanceProcedure,
    pub tax_type: TaxType,
    pub level1_weights: Level1Weights,
    pub synthesizer: Option<SynthesizerConfig>,
    pub detail_override: Option<DetailOverride>,
}

impl Account {
    pub fn new(key: AccountKey, portfolio_id: PortfolioId, tax_type: TaxType) -> Self {
        Account {
            key,
            portfolio_id,
            rebalance_order: 0,
            procedure: RebalanceProcedure::Percent,
            tax_type,
            level1_weights: Level1Weights {
                stock: 0.0,
                bond: 0.0,
                cash: 0.0,
                real_estate: 0.0,
            },
            synthesizer: None,
            detail_override: None,
        }
    }

    pub fn with_order(mut self, order: u32) -> Self {
        self.rebalance_order = order;
        self
    }

    pub fn with_level1_weights(mut self, weights: Level1Weights) -> Self {
        self.level1_weights = weights;
        self
    }

    pub fn with_synthesizer(mut self, synthesizer: SynthesizerConfig) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    pub fn with_detail_override(mut self, detail: DetailOverride) -> Self {
        self.detail_override = Some(detail);
        self
    }
}
