//! Yearly compensation: twelve regular months plus bonus streams.
//!
//! Bonuses carry no compulsory insurance.  Each bonus stream is taxed
//! with the same progressive table as salary, stacked on top of one
//! regular month's taxable income: its tax is the increase in monthly
//! tax caused by adding the bonus to that month.  Streams are stacked
//! independently of each other, and a bonus first absorbs any
//! deduction left unused by the regular salary.

use crate::models::{BonusInput, SalaryInput};
use crate::money::{round_div, Vnd};
use crate::regime::TaxRegime;
use crate::salary::{gross_to_net, SalaryResult};
use crate::tax::evaluate_tax;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    Month13,
    Kpi,
    Performance,
    Other,
}

/// One bonus stream, taxed on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusStream {
    pub kind: BonusKind,
    pub label: String,
    pub gross: Vnd,
    /// Part of the bonus left taxable after unused deductions.
    pub taxable_income: Vnd,
    pub tax: Vnd,
    pub net: Vnd,
    /// Rate of the highest bracket the stacked month reaches.
    pub marginal_rate: f64,
    pub effective_rate: f64,
}

/// The regular salary summed over twelve separately computed months.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularStream {
    pub months: Vec<SalaryResult>,
    pub gross: Vnd,
    pub contributions: Vnd,
    pub tax: Vnd,
    pub net: Vnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualTotals {
    pub gross: Vnd,
    pub contributions: Vnd,
    pub tax: Vnd,
    pub net: Vnd,
    pub bonus_gross: Vnd,
    pub bonus_tax: Vnd,
    pub average_monthly_net: Vnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitLine {
    pub yearly: Vnd,
    pub monthly: Vnd,
}

impl SplitLine {
    fn share(total: Vnd, percent: i128) -> Self {
        let yearly = round_div(total as i128 * percent, 100) as Vnd;
        Self {
            yearly,
            monthly: round_div(yearly as i128, 12) as Vnd,
        }
    }
}

/// The 50/30/20 budgeting rule applied to yearly net income.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancialAdviceSplit {
    pub needs: SplitLine,
    pub wants: SplitLine,
    pub savings: SplitLine,
}

impl FinancialAdviceSplit {
    pub fn from_net(total_net: Vnd) -> Self {
        Self {
            needs: SplitLine::share(total_net, 50),
            wants: SplitLine::share(total_net, 30),
            savings: SplitLine::share(total_net, 20),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualCompensation {
    pub year: i32,
    pub regular: RegularStream,
    pub month13: BonusStream,
    pub kpi_bonus: BonusStream,
    pub performance_bonus: BonusStream,
    pub other_bonuses: Vec<BonusStream>,
    pub totals: AnnualTotals,
    pub financial_advice_split: FinancialAdviceSplit,
}

impl AnnualCompensation {
    pub fn bonus_streams(&self) -> impl Iterator<Item = &BonusStream> {
        [&self.month13, &self.kpi_bonus, &self.performance_bonus]
            .into_iter()
            .chain(self.other_bonuses.iter())
    }
}

/// Taxable income of a month before clamping at zero.  Negative values
/// are deductions the salary leaves unused.
fn unclamped_taxable(month: &SalaryResult) -> Vnd {
    month.gross - month.contributions.total - month.deductions.total - month.extra_exempt
}

fn bonus_stream(kind: BonusKind, label: &str, amount: Vnd, month: &SalaryResult, regime: &TaxRegime) -> BonusStream {
    let gross = amount.max(0);
    let base = unclamped_taxable(month);
    let before = evaluate_tax(base.max(0), regime);
    let after = evaluate_tax((base + gross).max(0), regime);
    let taxable_income = after.taxable_income - before.taxable_income;
    let tax = after.total_tax - before.total_tax;
    BonusStream {
        kind,
        label: label.to_string(),
        gross,
        taxable_income,
        tax,
        net: gross - tax,
        marginal_rate: after.marginal_rate,
        effective_rate: if gross > 0 { tax as f64 / gross as f64 } else { 0.0 },
    }
}

/// Aggregates a year of salary and bonuses under one regime.
///
/// `monthly` describes the regular month (gross amount, dependents,
/// exempt income).  Every month is converted on its own.
pub fn aggregate_annual(monthly: &SalaryInput, bonuses: &BonusInput, regime: &TaxRegime) -> AnnualCompensation {
    let months: Vec<SalaryResult> = (1..=12).map(|_| gross_to_net(monthly, regime)).collect();
    let regular = RegularStream {
        gross: months.iter().map(|m| m.gross).sum(),
        contributions: months.iter().map(|m| m.contributions.total).sum(),
        tax: months.iter().map(|m| m.tax.total_tax).sum(),
        net: months.iter().map(|m| m.net).sum(),
        months,
    };

    // Bonuses are paid with the December salary.
    let december = &regular.months[11];
    let month13 = bonus_stream(BonusKind::Month13, "13th-month salary", bonuses.month13, december, regime);
    let kpi_bonus = bonus_stream(BonusKind::Kpi, "KPI bonus", bonuses.kpi, december, regime);
    let performance_bonus = bonus_stream(
        BonusKind::Performance,
        "Performance bonus",
        bonuses.performance,
        december,
        regime,
    );
    let other_bonuses: Vec<BonusStream> = bonuses
        .other
        .iter()
        .map(|b| bonus_stream(BonusKind::Other, &b.label, b.amount, december, regime))
        .collect();

    let (bonus_gross, bonus_tax, bonus_net) = [&month13, &kpi_bonus, &performance_bonus]
        .into_iter()
        .chain(other_bonuses.iter())
        .fold((0, 0, 0), |(g, t, n), b| (g + b.gross, t + b.tax, n + b.net));

    let net = regular.net + bonus_net;
    let totals = AnnualTotals {
        gross: regular.gross + bonus_gross,
        contributions: regular.contributions,
        tax: regular.tax + bonus_tax,
        net,
        bonus_gross,
        bonus_tax,
        average_monthly_net: round_div(net as i128, 12) as Vnd,
    };
    debug!(
        year = regime.year(),
        gross = totals.gross,
        net = totals.net,
        bonus_tax,
        "aggregated annual compensation"
    );

    AnnualCompensation {
        year: regime.year(),
        regular,
        month13,
        kpi_bonus,
        performance_bonus,
        other_bonuses,
        financial_advice_split: FinancialAdviceSplit::from_net(totals.net),
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OtherBonus;

    #[test]
    fn test_regular_months_without_bonuses() {
        let annual = aggregate_annual(
            &SalaryInput::new(20_000_000, 0),
            &BonusInput::default(),
            &TaxRegime::vn_2026(),
        );
        assert_eq!(annual.regular.months.len(), 12);
        assert_eq!(annual.regular.gross, 240_000_000);
        assert_eq!(annual.regular.contributions, 25_200_000);
        assert_eq!(annual.regular.tax, 1_440_000);
        assert_eq!(annual.regular.net, 213_360_000);
        assert_eq!(annual.totals.net, 213_360_000);
        assert_eq!(annual.totals.average_monthly_net, 17_780_000);
        assert_eq!(annual.month13.gross, 0);
        assert_eq!(annual.month13.tax, 0);
        assert_eq!(annual.month13.effective_rate, 0.0);
    }

    #[test]
    fn test_bonus_streams_taxed_progressively_and_independently() {
        let bonuses = BonusInput {
            month13: 20_000_000,
            kpi: 10_000_000,
            performance: 0,
            other: vec![OtherBonus {
                label: "Tet gift".to_string(),
                amount: 2_000_000,
            }],
        };
        let annual = aggregate_annual(&SalaryInput::new(20_000_000, 0), &bonuses, &TaxRegime::vn_2026());

        // Regular month taxable is 2.4M; 2.4M + 20M = 22.4M.
        // tax(22.4M) = 0.5M + 1.24M = 1.74M, minus tax(2.4M) = 0.12M
        assert_eq!(annual.month13.taxable_income, 20_000_000);
        assert_eq!(annual.month13.tax, 1_620_000);
        assert_eq!(annual.month13.net, 18_380_000);
        assert_eq!(annual.month13.marginal_rate, 0.10);

        // tax(12.4M) = 0.5M + 0.24M, minus 0.12M
        assert_eq!(annual.kpi_bonus.tax, 620_000);
        // 4.4M stays in the first bracket
        assert_eq!(annual.other_bonuses[0].tax, 100_000);
        assert_eq!(annual.other_bonuses[0].label, "Tet gift");

        assert_eq!(annual.totals.bonus_gross, 32_000_000);
        assert_eq!(annual.totals.bonus_tax, 2_340_000);
        assert_eq!(annual.totals.gross, 272_000_000);
        assert_eq!(annual.totals.net, 213_360_000 + 32_000_000 - 2_340_000);
        assert_eq!(annual.bonus_streams().count(), 4);
    }

    #[test]
    fn test_bonus_absorbs_unused_deductions() {
        // 10M salary leaves 6.55M of the 15.5M deduction unused.
        let bonuses = BonusInput {
            month13: 10_000_000,
            ..Default::default()
        };
        let annual = aggregate_annual(&SalaryInput::new(10_000_000, 0), &bonuses, &TaxRegime::vn_2026());
        assert_eq!(annual.regular.tax, 0);
        assert_eq!(annual.month13.taxable_income, 3_450_000);
        assert_eq!(annual.month13.tax, 172_500);
    }

    #[test]
    fn test_financial_advice_split() {
        let split = FinancialAdviceSplit::from_net(240_000_000);
        assert_eq!(split.needs, SplitLine { yearly: 120_000_000, monthly: 10_000_000 });
        assert_eq!(split.wants, SplitLine { yearly: 72_000_000, monthly: 6_000_000 });
        assert_eq!(split.savings, SplitLine { yearly: 48_000_000, monthly: 4_000_000 });

        let split = FinancialAdviceSplit::from_net(0);
        assert_eq!(split.savings.monthly, 0);
    }
}
