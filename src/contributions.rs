//! Compulsory insurance contributions.
//!
//! Social and health insurance are charged on the salary capped at the
//! regime's social/health cap; unemployment insurance uses its own cap.
//! Each line is rounded on its own before the total is formed.

use crate::money::{apply_rate, Vnd};
use crate::regime::TaxRegime;
use serde::{Deserialize, Serialize};

/// Employee-side contributions withheld from gross salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionResult {
    pub social_insurance: Vnd,
    pub health_insurance: Vnd,
    pub unemployment_insurance: Vnd,
    pub total: Vnd,
    /// Salary base used for social and health insurance.
    pub capped_base_used: Vnd,
    /// Salary base used for unemployment insurance.
    pub unemployment_base_used: Vnd,
}

/// Employer-side contributions on the same capped bases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployerContributions {
    pub social_insurance: Vnd,
    pub health_insurance: Vnd,
    pub unemployment_insurance: Vnd,
    pub total: Vnd,
}

fn capped_bases(salary: Vnd, regime: &TaxRegime) -> (Vnd, Vnd) {
    let salary = salary.max(0);
    let scheme = regime.insurance();
    (
        salary.min(scheme.social_health_cap),
        salary.min(scheme.unemployment_cap),
    )
}

/// Employee contributions for a monthly insurance salary.
pub fn calculate_contributions(salary: Vnd, regime: &TaxRegime) -> ContributionResult {
    let scheme = regime.insurance();
    let (social_health_base, unemployment_base) = capped_bases(salary, regime);
    let social_insurance = apply_rate(social_health_base, scheme.social_rate_bp);
    let health_insurance = apply_rate(social_health_base, scheme.health_rate_bp);
    let unemployment_insurance = apply_rate(unemployment_base, scheme.unemployment_rate_bp);
    ContributionResult {
        social_insurance,
        health_insurance,
        unemployment_insurance,
        total: social_insurance + health_insurance + unemployment_insurance,
        capped_base_used: social_health_base,
        unemployment_base_used: unemployment_base,
    }
}

/// Employer contributions for a monthly insurance salary.
pub fn calculate_employer_contributions(salary: Vnd, regime: &TaxRegime) -> EmployerContributions {
    let scheme = regime.insurance();
    let (social_health_base, unemployment_base) = capped_bases(salary, regime);
    let social_insurance = apply_rate(social_health_base, scheme.employer_social_rate_bp);
    let health_insurance = apply_rate(social_health_base, scheme.employer_health_rate_bp);
    let unemployment_insurance = apply_rate(unemployment_base, scheme.employer_unemployment_rate_bp);
    EmployerContributions {
        social_insurance,
        health_insurance,
        unemployment_insurance,
        total: social_insurance + health_insurance + unemployment_insurance,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncapped_salary() {
        let result = calculate_contributions(20_000_000, &TaxRegime::vn_2026());
        assert_eq!(result.social_insurance, 1_600_000);
        assert_eq!(result.health_insurance, 300_000);
        assert_eq!(result.unemployment_insurance, 200_000);
        assert_eq!(result.total, 2_100_000);
        assert_eq!(result.capped_base_used, 20_000_000);
        assert_eq!(result.unemployment_base_used, 20_000_000);
    }

    #[test]
    fn test_caps_apply_independently() {
        let result = calculate_contributions(80_000_000, &TaxRegime::vn_2026());
        assert_eq!(result.capped_base_used, 46_800_000);
        assert_eq!(result.unemployment_base_used, 80_000_000);
        assert_eq!(result.social_insurance, 3_744_000);
        assert_eq!(result.health_insurance, 702_000);
        assert_eq!(result.unemployment_insurance, 800_000);
        assert_eq!(result.total, 5_246_000);

        let result = calculate_contributions(200_000_000, &TaxRegime::vn_2025());
        assert_eq!(result.unemployment_base_used, 99_200_000);
        assert_eq!(result.unemployment_insurance, 992_000);
    }

    #[test]
    fn test_each_line_rounds_separately() {
        // 8% of 1_033 = 82.64, 1.5% = 15.495, 1% = 10.33
        let result = calculate_contributions(1_033, &TaxRegime::vn_2026());
        assert_eq!(result.social_insurance, 83);
        assert_eq!(result.health_insurance, 15);
        assert_eq!(result.unemployment_insurance, 10);
        assert_eq!(result.total, 108);
    }

    #[test]
    fn test_negative_salary_contributes_nothing() {
        let result = calculate_contributions(-1, &TaxRegime::vn_2026());
        assert_eq!(result.total, 0);
    }

    #[test]
    fn test_employer_contributions() {
        let result = calculate_employer_contributions(20_000_000, &TaxRegime::vn_2026());
        assert_eq!(result.social_insurance, 3_500_000);
        assert_eq!(result.health_insurance, 600_000);
        assert_eq!(result.unemployment_insurance, 200_000);
        assert_eq!(result.total, 4_300_000);
    }
}
