//! Derives an account's current value when it is absent (spec §4.7).
//!
//! Synthesised values are opaque to the rebalancer beyond their sign and
//! magnitude — this module's only job is to produce that one `f64` before
//! [`crate::engine`] hands the account to the rebalance pipeline.

use jiff::civil::Date;
use rustc_hash::FxHashMap;

use crate::date_math::{fast_days_between, months_between};
use crate::error::{Diagnostic, DiagnosticKind};
use crate::model::account::{Account, SynthesizerKind};
use crate::model::ids::AccountKey;
use crate::model::portfolio::Portfolio;

/// Derives `account`'s value per its [`SynthesizerKind`], or `None` if it
/// carries no synthesizer at all (the caller should use the account's
/// already-known holdings total instead). `values_so_far` holds the
/// already-synthesized or already-known value of every other account in
/// the portfolio processed so far, keyed by account; Averaging and
/// Negation reference into it.
pub fn synthesize_value(
    account: &Account,
    portfolio: &Portfolio,
    inflation: f64,
    now: Date,
    values_so_far: &FxHashMap<AccountKey, f64>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<f64> {
    let config = account.synthesizer.as_ref()?;

    let value = match config.kind {
        SynthesizerKind::CpiAnnuity => {
            let months = months_between(now, portfolio.mortality_date).max(0);
            portfolio.monthly_annuity_income * months as f64
        }
        SynthesizerKind::NoCpiAnnuity => {
            let months = months_between(now, portfolio.mortality_date).max(0);
            no_cpi_annuity_value(portfolio.monthly_annuity_income, inflation, months)
        }
        SynthesizerKind::SocialSecurity => {
            let start = later(now, portfolio.age_62_date());
            let months = months_between(start, portfolio.mortality_date).max(0);
            portfolio.monthly_social_security_income * months as f64
        }
        SynthesizerKind::Averaging => {
            let referenced = referenced_values(config, values_so_far, account.key, diagnostics);
            if referenced.is_empty() {
                0.0
            } else {
                referenced.iter().sum::<f64>() / referenced.len() as f64
            }
        }
        SynthesizerKind::Negation => {
            let referenced = referenced_values(config, values_so_far, account.key, diagnostics);
            -referenced.iter().sum::<f64>()
        }
    };

    Some(value)
}

fn later(a: Date, b: Date) -> Date {
    if fast_days_between(a, b) >= 0 { b } else { a }
}

/// Sum-of-monthly-payments decayed by `(1 + inflation)^-n` per elapsed
/// year, accumulated monthly (spec §4.7's "No-CPI-Annuity").
fn no_cpi_annuity_value(monthly_income: f64, inflation: f64, months: i32) -> f64 {
    (0..months)
        .map(|m| {
            let elapsed_years = m as f64 / 12.0;
            monthly_income * (1.0 + inflation).powf(-elapsed_years)
        })
        .sum()
}

fn referenced_values(
    config: &crate::model::account::SynthesizerConfig,
    values_so_far: &FxHashMap<AccountKey, f64>,
    owner: AccountKey,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<f64> {
    config
        .referenced_accounts
        .iter()
        .filter_map(|key| match values_so_far.get(key) {
            Some(&v) => Some(v),
            None => {
                diagnostics.push(Diagnostic::account(
                    owner,
                    DiagnosticKind::SynthesizerMissingReference,
                    format!("synthesizer references account {key:?} with no known value yet"),
                ));
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::civil::date;
    use crate::model::account::SynthesizerConfig;
    use crate::model::ids::{AccountKey, InstitutionId, PortfolioId};
    use crate::model::portfolio::{FilingStatus, Level1Weights};

    fn key(n: u64) -> AccountKey {
        AccountKey {
            institution: InstitutionId(1),
            account_number: n,
        }
    }

    fn portfolio() -> Portfolio {
        Portfolio {
            id: PortfolioId(1),
            filing_status: FilingStatus::Single,
            birth_date: date(1960, 1, 1),
            mortality_date: date(1960 + 30, 1, 1),
            monthly_annuity_income: 1000.0,
            monthly_social_security_income: 2000.0,
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

    fn account_with(kind: SynthesizerKind, referenced: Vec<AccountKey>) -> Account {
        Account::new(key(1), PortfolioId(1), crate::model::account::TaxType::Taxable)
            .with_synthesizer(SynthesizerConfig {
                kind,
                referenced_accounts: referenced,
            })
    }

    #[test]
    fn no_synthesizer_returns_none() {
        let account = Account::new(key(1), PortfolioId(1), crate::model::account::TaxType::Taxable);
        let p = portfolio();
        let mut diagnostics = Vec::new();
        assert!(synthesize_value(&account, &p, 0.0, date(1990, 1, 1), &FxHashMap::default(), &mut diagnostics).is_none());
    }

    #[test]
    fn cpi_annuity_sums_monthly_income_across_remaining_months() {
        let account = account_with(SynthesizerKind::CpiAnnuity, vec![]);
        let p = portfolio();
        let now = date(2020, 1, 1); // 10 years before mortality
        let mut diagnostics = Vec::new();
        let value = synthesize_value(&account, &p, 0.0, now, &FxHashMap::default(), &mut diagnostics).unwrap();
        assert!((value - 1000.0 * 120.0).abs() < 1e-6);
    }

    #[test]
    fn no_cpi_annuity_is_strictly_less_than_cpi_annuity_with_positive_inflation() {
        let account = account_with(SynthesizerKind::NoCpiAnnuity, vec![]);
        let p = portfolio();
        let now = date(2020, 1, 1);
        let mut diagnostics = Vec::new();
        let decayed = synthesize_value(&account, &p, 0.03, now, &FxHashMap::default(), &mut diagnostics).unwrap();
        let flat = 1000.0 * months_between(now, p.mortality_date) as f64;
        assert!(decayed < flat);
        assert!(decayed > 0.0);
    }

    #[test]
    fn social_security_starts_no_earlier_than_age_62() {
        let mut account = account_with(SynthesizerKind::SocialSecurity, vec![]);
        account.portfolio_id = PortfolioId(1);
        let mut p = portfolio();
        p.birth_date = date(1970, 1, 1);
        p.mortality_date = date(2050, 1, 1);
        let now = date(2010, 1, 1); // long before age 62 (2032)
        let mut diagnostics = Vec::new();
        let value = synthesize_value(&account, &p, 0.0, now, &FxHashMap::default(), &mut diagnostics).unwrap();
        let expected_months = months_between(date(2032, 1, 1), date(2050, 1, 1));
        assert!((value - 2000.0 * expected_months as f64).abs() < 1e-6);
    }

    #[test]
    fn averaging_takes_the_mean_of_referenced_accounts() {
        let account = account_with(SynthesizerKind::Averaging, vec![key(2), key(3)]);
        let mut values = FxHashMap::default();
        values.insert(key(2), 1000.0);
        values.insert(key(3), 3000.0);
        let p = portfolio();
        let mut diagnostics = Vec::new();
        let value = synthesize_value(&account, &p, 0.0, date(2020, 1, 1), &values, &mut diagnostics).unwrap();
        assert!((value - 2000.0).abs() < 1e-6);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn negation_sums_and_flips_sign() {
        let account = account_with(SynthesizerKind::Negation, vec![key(2), key(3)]);
        let mut values = FxHashMap::default();
        values.insert(key(2), 1000.0);
        values.insert(key(3), 500.0);
        let p = portfolio();
        let mut diagnostics = Vec::new();
        let value = synthesize_value(&account, &p, 0.0, date(2020, 1, 1), &values, &mut diagnostics).unwrap();
        assert!((value - (-1500.0)).abs() < 1e-6);
    }

    #[test]
    fn missing_referenced_account_is_diagnosed() {
        let account = account_with(SynthesizerKind::Averaging, vec![key(99)]);
        let p = portfolio();
        let mut diagnostics = Vec::new();
        synthesize_value(&account, &p, 0.0, date(2020, 1, 1), &FxHashMap::default(), &mut diagnostics).unwrap();
        assert_eq!(diagnostics.len(), 1);
    }
}
