//! Portfolio definitions (spec §3).

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::model::ids::PortfolioId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
}

/// Level-1 target weights shared by [`crate::model::Portfolio`] and
/// [`crate::model::Account`] — both carry a stock/bond/cash/real-estate
/// quadruple, per spec §3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level1Weights {
    pub stock: f64,
    pub bond: f64,
    pub cash: f64,
    pub real_estate: f64,
}

impl Level1Weights {
    pub fn sum(&self) -> f64 {
        self.stock + self.bond + self.cash + self.real_estate
    }
}

/// A household's overall plan: filing status, life-expectancy inputs,
/// income streams used by the synthesiser (§4.7), and the level-1 target
/// weights the closure pass (§4.6) reconciles the last account against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: PortfolioId,
    pub filing_status: FilingStatus,
    pub birth_date: Date,
    pub mortality_date: Date,
    pub monthly_annuity_income: f64,
    pub monthly_social_security_income: f64,
    pub taxable_income: f64,
    pub level1_weights: Level1Weights,
    /// Market-adjuster inputs (spec §4.3). `increase_at_bear` defaults to
    /// half of `increase_at_zero` when unset but `increase_at_zero` is.
    pub increase_at_zero: Option<f64>,
    pub increase_at_bear: Option<f64>,
}

impl Portfolio {
    /// Age-62 date, used by the Social-Security synthesiser (§4.7).
    pub fn age_62_date(&self) -> Date {
        crate::date_math::add_years(self.birth_date, 62)
    }

    pub fn effective_increase_at_bear(&self) -> Option<f64> {
        match (self.increase_at_bear, self.increase_at_zero) {
            (Some(bear), _) => Some(bear),
            (None, Some(zero)) => Some(zero / 2.0),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;

    fn portfolio() -> Portfolio {
        Portfolio {
            id: PortfolioId(1),
            filing_status: FilingStatus::Single,
            birth_date: date(1960, 3, 15),
            mortality_date: date(2040, 3, 15),
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

    #[test]
    fn age_62_date_adds_62_years() {
        let p = portfolio();
        assert_eq!(p.age_62_date(), date(2022, 3, 15));
    }

    #[test]
    fn increase_at_bear_defaults_to_half_increase_at_zero() {
        let mut p = portfolio();
        p.increase_at_zero = Some(0.10);
        assert_eq!(p.effective_increase_at_bear(), Some(0.05));
    }

    #[test]
    fn increase_at_bear_explicit_value_wins() {
        let mut p = portfolio();
        p.increase_at_zero = Some(0.10);
        p.increase_at_bear = Some(0.02);
        assert_eq!(p.effective_increase_at_bear(), Some(0.02));
    }

    #[test]
    fn neither_set_is_none() {
        let p = portfolio();
        assert_eq!(p.effective_increase_at_bear(), None);
    }
}
