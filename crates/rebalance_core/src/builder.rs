//! Fluent builder DSL for assembling portfolios, accounts, tickers, and
//! holdings without a CSV loader — used throughout the test suite and by
//! the `demos/` smoke-test binary.
//!
//! Mirrors `finplan_core::config`'s `AccountBuilder`/`AssetBuilder`/
//! `EventBuilder`/`SimulationBuilder`: preset or minimal constructors plus
//! `#[must_use]` fluent setters, consumed by a final `build()`.

use jiff::civil::{Date, date};

use crate::model::account::{
    Account, DetailOverride, RebalanceProcedure, SynthesizerConfig, SynthesizerKind, TaxType,
};
use crate::model::holding::Holding;
use crate::model::ids::{AccountKey, InstitutionId, PortfolioId};
use crate::model::portfolio::{FilingStatus, Level1Weights, Portfolio};
use crate::model::subcode::Subcodes;
use crate::model::ticker::{Ticker, TickerKind};

/// Builds a [`Portfolio`]. Life-expectancy dates default to a wide,
/// deliberately-arbitrary range so tests that don't care about the
/// synthesiser don't need to set them.
#[derive(Debug, Clone)]
pub struct PortfolioBuilder {
    id: u32,
    filing_status: FilingStatus,
    birth_date: Date,
    mortality_date: Date,
    monthly_annuity_income: f64,
    monthly_social_security_income: f64,
    taxable_income: f64,
    level1_weights: Level1Weights,
    increase_at_zero: Option<f64>,
    increase_at_bear: Option<f64>,
}

impl PortfolioBuilder {
    #[must_use]
    pub fn new(id: u32) -> Self {
        PortfolioBuilder {
            id,
            filing_status: FilingStatus::Single,
            birth_date: date(1960, 1, 1),
            mortality_date: date(2040, 1, 1),
            monthly_annuity_income: 0.0,
            monthly_social_security_income: 0.0,
            taxable_income: 0.0,
            level1_weights: Level1Weights {
                stock: 50.0,
                bond: 36.0,
                cash: 10.0,
                real_estate: 4.0,
            },
            increase_at_zero: None,
            increase_at_bear: None,
        }
    }

    #[must_use]
    pub fn filing_status(mut self, filing_status: FilingStatus) -> Self {
        self.filing_status = filing_status;
        self
    }

    #[must_use]
    pub fn birth_date(mut self, year: i16, month: i8, day: i8) -> Self {
        self.birth_date = date(year, month, day);
        self
    }

    #[must_use]
    pub fn mortality_date(mut self, year: i16, month: i8, day: i8) -> Self {
        self.mortality_date = date(year, month, day);
        self
    }

    #[must_use]
    pub fn monthly_annuity_income(mut self, amount: f64) -> Self {
        self.monthly_annuity_income = amount;
        self
    }

    #[must_use]
    pub fn monthly_social_security_income(mut self, amount: f64) -> Self {
        self.monthly_social_security_income = amount;
        self
    }

    #[must_use]
    pub fn taxable_income(mut self, amount: f64) -> Self {
        self.taxable_income = amount;
        self
    }

    #[must_use]
    pub fn level1_weights(mut self, stock: f64, bond: f64, cash: f64, real_estate: f64) -> Self {
        self.level1_weights = Level1Weights {
            stock,
            bond,
            cash,
            real_estate,
        };
        self
    }

    #[must_use]
    pub fn increase_at_zero(mut self, amount: f64) -> Self {
        self.increase_at_zero = Some(amount);
        self
    }

    #[must_use]
    pub fn increase_at_bear(mut self, amount: f64) -> Self {
        self.increase_at_bear = Some(amount);
        self
    }

    #[must_use]
    pub fn build(self) -> Portfolio {
        Portfolio {
            id: PortfolioId(self.id),
            filing_status: self.filing_status,
            birth_date: self.birth_date,
            mortality_date: self.mortality_date,
            monthly_annuity_income: self.monthly_annuity_income,
            monthly_social_security_income: self.monthly_social_security_income,
            taxable_income: self.taxable_income,
            level1_weights: self.level1_weights,
            increase_at_zero: self.increase_at_zero,
            increase_at_bear: self.increase_at_bear,
        }
    }
}

/// Builds an [`Account`]. `new` takes the (institution, account-number)
/// pair plus the owning portfolio id, since those three identify the
/// account and every other field has a sensible default.
#[derive(Debug, Clone)]
pub struct AccountBuilder {
    key: AccountKey,
    portfolio_id: PortfolioId,
    rebalance_order: u32,
    procedure: RebalanceProcedure,
    tax_type: TaxType,
    level1_weights: Level1Weights,
    synthesizer: Option<SynthesizerConfig>,
    detail_override: Option<DetailOverride>,
}

impl AccountBuilder {
    #[must_use]
    pub fn new(institution: u32, account_number: u64, portfolio_id: u32) -> Self {
        AccountBuilder {
            key: AccountKey {
                institution: InstitutionId(institution),
                account_number,
            },
            portfolio_id: PortfolioId(portfolio_id),
            rebalance_order: 0,
            procedure: RebalanceProcedure::Percent,
            tax_type: TaxType::Taxable,
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

    #[must_use]
    pub fn order(mut self, order: u32) -> Self {
        self.rebalance_order = order;
        self
    }

    #[must_use]
    pub fn procedure(mut self, procedure: RebalanceProcedure) -> Self {
        self.procedure = procedure;
        self
    }

    #[must_use]
    pub fn tax_type(mut self, tax_type: TaxType) -> Self {
        self.tax_type = tax_type;
        self
    }

    #[must_use]
    pub fn level1_weights(mut self, stock: f64, bond: f64, cash: f64, real_estate: f64) -> Self {
        self.level1_weights = Level1Weights {
            stock,
            bond,
            cash,
            real_estate,
        };
        self
    }

    #[must_use]
    pub fn synthesizer(mut self, kind: SynthesizerKind, referenced_accounts: Vec<AccountKey>) -> Self {
        self.synthesizer = Some(SynthesizerConfig {
            kind,
            referenced_accounts,
        });
        self
    }

    #[must_use]
    pub fn detail_override(mut self, weights: Vec<(String, f64)>) -> Self {
        self.detail_override = Some(DetailOverride { weights });
        self
    }

    #[must_use]
    pub fn build(self) -> Account {
        Account {
            key: self.key,
            portfolio_id: self.portfolio_id,
            rebalance_order: self.rebalance_order,
            procedure: self.procedure,
            tax_type: self.tax_type,
            level1_weights: self.level1_weights,
            synthesizer: self.synthesizer,
            detail_override: self.detail_override,
        }
    }
}

/// Builds a [`Ticker`]. Preset constructors mirror the four
/// [`TickerKind`] variants, the same "named constructor per flavor, fluent
/// setters after" shape as `finplan_core::config::AccountBuilder`'s
/// `taxable_brokerage`/`roth_ira`/... presets.
#[derive(Debug, Clone)]
pub struct TickerBuilder {
    symbol: String,
    kind: TickerKind,
    min_investment: f64,
    preferred_rounding: f64,
    subcodes: Subcodes,
}

impl TickerBuilder {
    fn new(symbol: impl Into<String>, kind: TickerKind) -> Self {
        TickerBuilder {
            symbol: symbol.into(),
            kind,
            min_investment: 0.0,
            preferred_rounding: 0.0,
            subcodes: Subcodes::NONE,
        }
    }

    #[must_use]
    pub fn fund_rebalanceable(symbol: impl Into<String>) -> Self {
        Self::new(symbol, TickerKind::FundRebalanceable)
    }

    #[must_use]
    pub fn fund_not_rebalanceable(symbol: impl Into<String>) -> Self {
        Self::new(symbol, TickerKind::FundNotRebalanceable)
    }

    #[must_use]
    pub fn single_security(symbol: impl Into<String>) -> Self {
        Self::new(symbol, TickerKind::SingleSecurity)
    }

    #[must_use]
    pub fn etf(symbol: impl Into<String>) -> Self {
        Self::new(symbol, TickerKind::Etf)
    }

    #[must_use]
    pub fn min_investment(mut self, amount: f64) -> Self {
        self.min_investment = amount;
        self
    }

    #[must_use]
    pub fn rounding(mut self, shares: f64) -> Self {
        self.preferred_rounding = shares;
        self
    }

    #[must_use]
    pub fn subcodes(mut self, subcodes: Subcodes) -> Self {
        self.subcodes = subcodes;
        self
    }

    /// Sets the ticker's subcodes from up to four characters, e.g.
    /// `"SDLG"` or `"CU"`. See [`Subcodes::from_str`].
    #[must_use]
    pub fn subcodes_str(mut self, codes: &str) -> Self {
        self.subcodes = Subcodes::from_str(codes);
        self
    }

    #[must_use]
    pub fn build(self) -> Ticker {
        Ticker {
            symbol: crate::model::ids::TickerSymbol::new(self.symbol),
            kind: self.kind,
            min_investment: self.min_investment,
            preferred_rounding: self.preferred_rounding,
            subcodes: self.subcodes,
        }
    }
}

/// Builds a [`Holding`]. `value` and `shares_and_price` mirror
/// [`Holding::from_value`]/[`Holding::from_shares_and_price`].
#[derive(Debug, Clone, Copy)]
pub struct HoldingBuilder {
    holding: Holding,
}

impl HoldingBuilder {
    #[must_use]
    pub fn value(value: f64) -> Self {
        HoldingBuilder {
            holding: Holding::from_value(value),
        }
    }

    #[must_use]
    pub fn shares_and_price(shares: f64, price: f64) -> Self {
        HoldingBuilder {
            holding: Holding::from_shares_and_price(shares, price),
        }
    }

    #[must_use]
    pub fn holding_weight(mut self, weight: f64) -> Self {
        self.holding = self.holding.with_holding_weight(weight);
        self
    }

    #[must_use]
    pub fn build(self) -> Holding {
        self.holding
    }
}
