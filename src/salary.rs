//! Monthly gross/net conversion.
//!
//! [`gross_to_net`] composes the contribution, deduction and tax
//! calculators.  [`net_to_gross`] inverts it by bisection: contributions
//! and tax are both non-decreasing in gross, so net salary is a
//! monotone function of gross whose value rises by at most one dong per
//! dong of gross.  Bisection over whole dong therefore lands exactly on
//! the requested net whenever the search bound contains it.

use crate::contributions::{
    calculate_contributions, calculate_employer_contributions, ContributionResult, EmployerContributions,
};
use crate::deductions::{monthly_deductions, Deductions};
use crate::error::ConvergenceError;
use crate::models::{Region, SalaryInput};
use crate::money::Vnd;
use crate::regime::TaxRegime;
use crate::tax::{evaluate_tax, TaxBreakdown};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// Hard cap on bisection steps.
pub const MAX_ITERATIONS: u32 = 100;
/// The gross search interval is `[net, net * BOUND_MULTIPLIER]`.
pub const BOUND_MULTIPLIER: Vnd = 3;
/// Accepted distance between the requested and reproduced net.
pub const NET_TOLERANCE: Vnd = 1;

/// Employer cost of the position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerCost {
    pub contributions: EmployerContributions,
    /// Gross salary plus employer contributions.
    pub total_cost: Vnd,
}

/// Twelve identical months of the same result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearlyProjection {
    pub gross: Vnd,
    pub contributions: Vnd,
    pub tax: Vnd,
    pub net: Vnd,
}

/// Outcome of a monthly conversion.
///
/// `gross == net + contributions.total + tax.total_tax` always holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryResult {
    pub gross: Vnd,
    pub net: Vnd,
    pub region: Region,
    pub dependent_count: u32,
    pub extra_exempt: Vnd,
    pub contributions: ContributionResult,
    pub deductions: Deductions,
    pub tax: TaxBreakdown,
    pub employer: EmployerCost,
    pub yearly_projection: YearlyProjection,
}

/// Converts the gross salary in `input.amount` to net.
pub fn gross_to_net(input: &SalaryInput, regime: &TaxRegime) -> SalaryResult {
    let gross = input.amount.max(0);
    let insurance_salary = input.insurance_salary.unwrap_or(gross);

    let contributions = calculate_contributions(insurance_salary, regime);
    let deductions = monthly_deductions(input.dependent_count, regime);
    let extra_exempt = input.extra_exempt.max(0);
    let taxable_income = (gross - contributions.total - deductions.total - extra_exempt).max(0);
    let tax = evaluate_tax(taxable_income, regime);
    let net = gross - contributions.total - tax.total_tax;

    let employer_contributions = calculate_employer_contributions(insurance_salary, regime);
    let employer = EmployerCost {
        total_cost: gross + employer_contributions.total,
        contributions: employer_contributions,
    };
    let yearly_projection = YearlyProjection {
        gross: gross * 12,
        contributions: contributions.total * 12,
        tax: tax.total_tax * 12,
        net: net * 12,
    };

    trace!(year = regime.year(), gross, net, tax = tax.total_tax, "gross to net");
    SalaryResult {
        gross,
        net,
        region: input.region,
        dependent_count: input.dependent_count,
        extra_exempt,
        contributions,
        deductions,
        tax,
        employer,
        yearly_projection,
    }
}

/// Finds the gross salary whose net equals `input.amount`.
///
/// All other fields of `input` (dependents, exempt income, declared
/// insurance salary) are held fixed during the search.
pub fn net_to_gross(input: &SalaryInput, regime: &TaxRegime) -> Result<SalaryResult, ConvergenceError> {
    let target = input.amount;
    let failure = |best: &SalaryResult, iterations: u32| {
        warn!(year = regime.year(), target, best_gross = best.gross, "net to gross did not converge");
        ConvergenceError {
            target_net: target,
            best_gross: best.gross,
            best_net: best.net,
            iterations,
        }
    };
    let at = |gross: Vnd| gross_to_net(&input.with_amount(gross), regime);

    let mut low = at(target.max(0));
    if target <= 0 {
        return Err(failure(&low, 0));
    }
    if low.net >= target {
        return Ok(low);
    }
    let mut high = at(target.saturating_mul(BOUND_MULTIPLIER));
    if high.net < target {
        return Err(failure(&high, 0));
    }

    // Invariant: low.net < target <= high.net
    let mut iterations = 0;
    while high.gross - low.gross > 1 {
        if iterations == MAX_ITERATIONS {
            return Err(failure(&high, iterations));
        }
        iterations += 1;
        let mid = at(low.gross + (high.gross - low.gross) / 2);
        trace!(iteration = iterations, gross = mid.gross, net = mid.net, "bisection step");
        if mid.net >= target {
            high = mid;
        } else {
            low = mid;
        }
    }

    let best = if (target - low.net).abs() < (high.net - target).abs() {
        low
    } else {
        high
    };
    if (best.net - target).abs() > NET_TOLERANCE {
        return Err(failure(&best, iterations));
    }
    debug!(year = regime.year(), target, gross = best.gross, iterations, "net to gross converged");
    Ok(best)
}

/// The same salary evaluated under two regimes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeComparison {
    pub from_year: i32,
    pub to_year: i32,
    pub from: SalaryResult,
    pub to: SalaryResult,
    /// Positive when the `to` regime charges less tax.
    pub monthly_tax_saving: Vnd,
    pub yearly_tax_saving: Vnd,
    pub monthly_net_gain: Vnd,
}

/// Compares the gross-to-net outcome of `input` under two regimes.
pub fn compare_regimes(input: &SalaryInput, from: &TaxRegime, to: &TaxRegime) -> RegimeComparison {
    let before = gross_to_net(input, from);
    let after = gross_to_net(input, to);
    let monthly_tax_saving = before.tax.total_tax - after.tax.total_tax;
    RegimeComparison {
        from_year: from.year(),
        to_year: to.year(),
        monthly_tax_saving,
        yearly_tax_saving: monthly_tax_saving * 12,
        monthly_net_gain: after.net - before.net,
        from: before,
        to: after,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gross_to_net_2026_example() {
        let result = gross_to_net(&SalaryInput::new(20_000_000, 0), &TaxRegime::vn_2026());
        assert_eq!(result.contributions.total, 2_100_000);
        assert_eq!(result.deductions.total, 15_500_000);
        assert_eq!(result.tax.taxable_income, 2_400_000);
        assert_eq!(result.tax.total_tax, 120_000);
        assert_eq!(result.tax.bracket, 1);
        assert_eq!(result.net, 17_780_000);
        assert_eq!(result.yearly_projection.net, 213_360_000);
        assert_eq!(result.employer.total_cost, 24_300_000);
    }

    #[test]
    fn test_gross_to_net_2025_example() {
        let result = gross_to_net(&SalaryInput::new(20_000_000, 0), &TaxRegime::vn_2025());
        assert_eq!(result.contributions.total, 2_100_000);
        assert_eq!(result.tax.taxable_income, 6_900_000);
        assert_eq!(result.tax.total_tax, 440_000);
        assert_eq!(result.tax.bracket, 2);
        assert_eq!(result.net, 17_460_000);
    }

    #[test]
    fn test_gross_to_net_high_salary_with_dependents() {
        let mut input = SalaryInput::new(100_000_000, 2);
        input.extra_exempt = 730_000;
        let result = gross_to_net(&input, &TaxRegime::vn_2026());
        // 46.8M * 9.5% + 100M * 1%
        assert_eq!(result.contributions.total, 5_446_000);
        // 100M - 5.446M - 15.5M - 12.4M - 0.73M
        assert_eq!(result.tax.taxable_income, 65_924_000);
        // 65.924M * 30% - 9.5M
        assert_eq!(result.tax.total_tax, 10_277_200);
        assert_eq!(result.net, 84_276_800);
        assert_eq!(
            result.gross,
            result.net + result.contributions.total + result.tax.total_tax
        );
    }

    #[test]
    fn test_income_below_deductions_is_untaxed() {
        let result = gross_to_net(&SalaryInput::new(10_000_000, 1), &TaxRegime::vn_2026());
        assert_eq!(result.tax.taxable_income, 0);
        assert_eq!(result.tax.total_tax, 0);
        assert_eq!(result.net, 8_950_000);
    }

    #[test]
    fn test_net_rises_at_most_one_dong_per_dong() {
        // The insurance rounding pattern repeats every 200 dong.
        for regime in [TaxRegime::vn_2025(), TaxRegime::vn_2026()] {
            for start in [0, 17_500_000, 46_799_800, 99_199_800, 106_199_800] {
                let mut previous = gross_to_net(&SalaryInput::new(start, 0), &regime).net;
                for gross in start + 1..=start + 400 {
                    let net = gross_to_net(&SalaryInput::new(gross, 0), &regime).net;
                    assert!(net >= previous, "net fell at gross {gross}");
                    assert!(net - previous <= 1, "net jumped at gross {gross}");
                    previous = net;
                }
            }
        }
    }

    #[test]
    fn test_insurance_salary_override() {
        let mut input = SalaryInput::new(30_000_000, 0);
        input.insurance_salary = Some(10_000_000);
        let result = gross_to_net(&input, &TaxRegime::vn_2026());
        assert_eq!(result.contributions.total, 1_050_000);
        assert_eq!(result.contributions.capped_base_used, 10_000_000);
        assert_eq!(result.tax.taxable_income, 13_450_000);
    }

    #[test]
    fn test_net_to_gross_round_trip() {
        let regime = TaxRegime::vn_2026();
        let result = net_to_gross(&SalaryInput::new(17_780_000, 0), &regime).unwrap();
        assert_eq!(result.gross, 20_000_000);
        assert_eq!(result.net, 17_780_000);

        for target in [5_000_000, 25_123_457, 80_000_000, 250_000_000] {
            let result = net_to_gross(&SalaryInput::new(target, 1), &regime).unwrap();
            assert!((result.net - target).abs() <= NET_TOLERANCE, "target {target}");
            let again = gross_to_net(&SalaryInput::new(result.gross, 1), &regime);
            assert_eq!(again.net, result.net);
        }
    }

    #[test]
    fn test_net_to_gross_rejects_non_positive_target() {
        let regime = TaxRegime::vn_2025();
        let err = net_to_gross(&SalaryInput::new(0, 0), &regime).unwrap_err();
        assert_eq!(err.target_net, 0);
        assert_eq!(err.iterations, 0);
        assert!(net_to_gross(&SalaryInput::new(-1_000, 0), &regime).is_err());
    }

    #[test]
    fn test_net_to_gross_with_insurance_free_income() {
        // No insurance and income under deductions: gross equals net.
        let mut input = SalaryInput::new(5_000_000, 0);
        input.insurance_salary = Some(0);
        let result = net_to_gross(&input, &TaxRegime::vn_2026()).unwrap();
        assert_eq!(result.gross, 5_000_000);
    }

    #[test]
    fn test_compare_regimes() {
        let cmp = compare_regimes(
            &SalaryInput::new(20_000_000, 0),
            &TaxRegime::vn_2025(),
            &TaxRegime::vn_2026(),
        );
        assert_eq!(cmp.from_year, 2025);
        assert_eq!(cmp.to_year, 2026);
        assert_eq!(cmp.monthly_tax_saving, 320_000);
        assert_eq!(cmp.yearly_tax_saving, 3_840_000);
        assert_eq!(cmp.monthly_net_gain, 320_000);
    }
}
