//! Data models for the Wage Engine.
//!
//! The `models` module defines the serialisable input value objects
//! that callers hand to the engine: salary inputs, bonus streams,
//! income sources for the year-end settlement, and job offers with the
//! user's priorities.  Upstream validation guarantees non-negative
//! amounts and a supported tax year; the engine does not re-check them.

use crate::money::Vnd;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Minimum-wage region.  Carried through for display only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[default]
    I,
    II,
    III,
    IV,
}

/// Monthly salary input for the gross/net converters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryInput {
    /// Gross salary for gross-to-net, target net for net-to-gross.
    pub amount: Vnd,
    #[serde(default)]
    pub dependent_count: u32,
    #[serde(default)]
    pub region: Region,
    /// Tax-exempt income (e.g. meal allowance) excluded from taxable income.
    #[serde(default)]
    pub extra_exempt: Vnd,
    /// Declared insurance salary when it differs from gross.
    #[serde(default)]
    pub insurance_salary: Option<Vnd>,
}

impl SalaryInput {
    pub fn new(amount: Vnd, dependent_count: u32) -> Self {
        Self {
            amount,
            dependent_count,
            region: Region::default(),
            extra_exempt: 0,
            insurance_salary: None,
        }
    }

    pub fn with_amount(&self, amount: Vnd) -> Self {
        Self {
            amount,
            ..self.clone()
        }
    }
}

/// A labelled bonus outside the named streams.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherBonus {
    pub label: String,
    pub amount: Vnd,
}

/// Annual bonus amounts, all gross.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusInput {
    pub month13: Vnd,
    pub kpi: Vnd,
    pub performance: Vnd,
    pub other: Vec<OtherBonus>,
}

/// One employment span feeding the year-end settlement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeSource {
    pub employer: String,
    /// Monthly basic salary.
    pub basic_salary: Vnd,
    pub months_worked: u32,
    /// Taxable allowances over the whole span.
    pub allowances: Vnd,
    pub bonus: Vnd,
    pub other_income: Vnd,
    /// Compulsory insurance already withheld over the span.
    pub insurance_paid: Vnd,
    /// Income tax already withheld over the span.
    pub tax_withheld: Vnd,
    pub period_from: Option<NaiveDate>,
    pub period_to: Option<NaiveDate>,
}

impl IncomeSource {
    /// Total taxable income of this span before deductions.
    pub fn total_income(&self) -> Vnd {
        self.basic_salary * self.months_worked as Vnd + self.allowances + self.bonus + self.other_income
    }
}

/// Cash compensation of an offer.  Salary is monthly gross.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Compensation {
    pub base_salary: Vnd,
    /// Guaranteed 13th-month pay, in months of base salary.
    pub month13_months: f64,
    pub annual_bonus: Vnd,
    pub signing_bonus: Vnd,
    /// Expected yearly value of equity grants.
    pub equity_annual_value: Vnd,
}

/// Monetised benefits.  Allowances are monthly, insurance is yearly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Benefits {
    pub health_insurance_annual: Vnd,
    pub meal_allowance: Vnd,
    pub transport_allowance: Vnd,
    pub phone_allowance: Vnd,
    pub internet_allowance: Vnd,
    pub gym_allowance: Vnd,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkLife {
    pub working_days_per_week: u32,
    pub working_hours_per_day: f64,
    pub remote_days_per_week: u32,
    pub annual_leave_days: u32,
}

impl Default for WorkLife {
    fn default() -> Self {
        Self {
            working_days_per_week: 5,
            working_hours_per_day: 8.0,
            remote_days_per_week: 0,
            annual_leave_days: 12,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Commute {
    pub distance_km: f64,
    pub monthly_cost: Vnd,
    /// Portion of the commute cost the employer reimburses each month.
    pub monthly_reimbursement: Vnd,
}

impl Commute {
    pub fn net_annual_cost(&self) -> Vnd {
        (self.monthly_cost - self.monthly_reimbursement).max(0) * 12
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompanyStage {
    Startup,
    Growth,
    #[default]
    Established,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Career {
    pub team_size: u32,
    pub company_stage: CompanyStage,
    pub high_growth: bool,
    pub training_budget_annual: Vnd,
}

/// Informational only; not part of any score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Culture {
    pub rating: Option<u8>,
    pub notes: String,
}

/// A job offer under comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobOffer {
    pub id: String,
    pub company: String,
    pub title: String,
    pub compensation: Compensation,
    pub benefits: Benefits,
    pub work_life: WorkLife,
    pub commute: Commute,
    pub career: Career,
    pub culture: Culture,
}

/// Raw 1–10 weights the user assigns to each concern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPriorities {
    pub salary: u8,
    pub bonuses: u8,
    pub benefits: u8,
    pub work_life_balance: u8,
    pub career: u8,
    pub commute: u8,
}

impl Default for UserPriorities {
    fn default() -> Self {
        Self {
            salary: 5,
            bonuses: 5,
            benefits: 5,
            work_life_balance: 5,
            career: 5,
            commute: 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_source_total() {
        let source = IncomeSource {
            basic_salary: 20_000_000,
            months_worked: 6,
            allowances: 3_000_000,
            bonus: 10_000_000,
            other_income: 500_000,
            ..Default::default()
        };
        assert_eq!(source.total_income(), 133_500_000);
    }

    #[test]
    fn test_salary_input_defaults_from_json() {
        let input: SalaryInput = serde_json::from_str(r#"{"amount": 30000000}"#).unwrap();
        assert_eq!(input, SalaryInput::new(30_000_000, 0));
        let input: SalaryInput =
            serde_json::from_str(r#"{"amount": 1, "region": "III", "dependent_count": 2}"#).unwrap();
        assert_eq!(input.region, Region::III);
        assert_eq!(input.dependent_count, 2);
    }

    #[test]
    fn test_commute_net_cost_never_negative() {
        let commute = Commute {
            monthly_cost: 500_000,
            monthly_reimbursement: 800_000,
            ..Default::default()
        };
        assert_eq!(commute.net_annual_cost(), 0);
    }
}
