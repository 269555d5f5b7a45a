use crate::model::{AccountKey, CategoryId, TickerSymbol};

/// A ticker's subcodes imply two incompatible branches of the category
/// tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationError {
    ConflictingSubcodes { at: CategoryId },
}

/// Why the leaf allocator could not place every unit of currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationError {
    /// Every ticker at this leaf was excluded by its minimum investment.
    UnallocableLeaf,
}

/// One recoverable condition encountered while rebalancing, attached to the
/// most specific entity involved. Diagnostics never abort a run — they
/// accumulate on the account or portfolio result, per spec.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub account: Option<AccountKey>,
    pub ticker: Option<TickerSymbol>,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn account(account: AccountKey, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            account: Some(account),
            ticker: None,
            kind,
            message: message.into(),
        }
    }

    pub fn ticker(
        account: AccountKey,
        ticker: TickerSymbol,
        kind: DiagnosticKind,
        message: impl Into<String>,
    ) -> Self {
        Diagnostic {
            account: Some(account),
            ticker: Some(ticker),
            kind,
            message: message.into(),
        }
    }

    pub fn portfolio(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            account: None,
            ticker: None,
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Ticker subcodes are inconsistent; the ticker is excluded and treated
    /// as non-rebalanceable for this run.
    InconsistentSubcodes,
    /// A ticker could not be bound to any leaf.
    UnclassifiableTicker,
    /// A leaf's constraints rule out every allocation.
    UnallocableLeaf,
    /// Closure pass computed a negative residual for a level-1 category;
    /// its weight was forced to zero.
    PortfolioOvershoot,
    /// `increase_at_bear` is too small relative to `increase_at_zero`; the
    /// hyperbola is non-monotone but the run proceeds anyway.
    NonMonotoneCurve,
    /// `ncnt`/`mxrt` was exhausted without finding a zero-residual
    /// candidate.
    BudgetExhausted,
    /// An Averaging/Negation synthesizer referenced an account with no
    /// known value yet.
    SynthesizerMissingReference,
    /// Residual bubbled all the way to the account root with no absorbing
    /// ticker anywhere in the tree to push it into.
    ResidualUnplaced,
}
