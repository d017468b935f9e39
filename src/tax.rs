//! Progressive tax evaluation.
//!
//! [`evaluate_tax`] computes the total tax for a monthly taxable income
//! using the regime's quick formula and decomposes it into per-bracket
//! lines for display.  Both computations are carried out exactly at
//! basis-point precision, and the lines are rounded cumulatively so that
//! they always sum to the rounded total.

use crate::money::{clamp_taxable, rate_ratio, round_div, BasisPoints, Vnd, BP_SCALE};
use crate::regime::TaxRegime;
use serde::{Deserialize, Serialize};

/// Tax attributable to one bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BracketLine {
    /// 1-based bracket number.
    pub bracket: usize,
    pub floor: Vnd,
    pub ceiling: Option<Vnd>,
    pub rate_bp: BasisPoints,
    /// Portion of the taxable income falling inside this bracket.
    pub income_in_bracket: Vnd,
    pub tax: Vnd,
}

/// Result of evaluating a taxable income against a regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxBreakdown {
    pub taxable_income: Vnd,
    pub total_tax: Vnd,
    /// Highest bracket reached (1-based), 0 when nothing is taxable.
    pub bracket: usize,
    pub effective_rate: f64,
    pub marginal_rate: f64,
    pub lines: Vec<BracketLine>,
}

impl TaxBreakdown {
    pub fn zero() -> Self {
        Self {
            taxable_income: 0,
            total_tax: 0,
            bracket: 0,
            effective_rate: 0.0,
            marginal_rate: 0.0,
            lines: Vec::new(),
        }
    }

    /// Multiplies every amount by `factor`, used to annualise a monthly
    /// evaluation.  Rates are left untouched.
    pub fn scaled(&self, factor: Vnd) -> Self {
        Self {
            taxable_income: self.taxable_income.saturating_mul(factor),
            total_tax: self.total_tax.saturating_mul(factor),
            lines: self
                .lines
                .iter()
                .map(|line| BracketLine {
                    income_in_bracket: line.income_in_bracket.saturating_mul(factor),
                    tax: line.tax.saturating_mul(factor),
                    ..line.clone()
                })
                .collect(),
            ..self.clone()
        }
    }
}

/// Total tax from the quick formula `income * rate - quick_subtraction`.
pub fn quick_formula_tax(taxable_income: Vnd, regime: &TaxRegime) -> Vnd {
    quick_formula_scaled(taxable_income, regime)
        .map(|scaled| round_div(scaled, BP_SCALE) as Vnd)
        .unwrap_or(0)
}

fn quick_formula_scaled(taxable_income: Vnd, regime: &TaxRegime) -> Option<i128> {
    let index = regime.bracket_index(taxable_income)?;
    let bracket = &regime.brackets()[index];
    Some(
        taxable_income as i128 * bracket.rate_bp as i128
            - bracket.quick_subtraction as i128 * BP_SCALE,
    )
}

/// Evaluates `taxable_income` against the regime's monthly brackets.
///
/// Non-positive incomes produce a zero breakdown.
pub fn evaluate_tax(taxable_income: Vnd, regime: &TaxRegime) -> TaxBreakdown {
    let Some(index) = regime.bracket_index(taxable_income) else {
        return TaxBreakdown::zero();
    };

    let mut lines = Vec::with_capacity(index + 1);
    let mut cumulative_scaled: i128 = 0;
    let mut cumulative_rounded: i128 = 0;
    for (i, bracket) in regime.brackets()[..=index].iter().enumerate() {
        let upper = bracket.ceiling.map_or(taxable_income, |c| c.min(taxable_income));
        let income_in_bracket = upper - bracket.floor;
        cumulative_scaled += income_in_bracket as i128 * bracket.rate_bp as i128;
        let rounded = round_div(cumulative_scaled, BP_SCALE);
        lines.push(BracketLine {
            bracket: i + 1,
            floor: bracket.floor,
            ceiling: bracket.ceiling,
            rate_bp: bracket.rate_bp,
            income_in_bracket,
            tax: (rounded - cumulative_rounded) as Vnd,
        });
        cumulative_rounded = rounded;
    }

    // Regime validation guarantees the quick constants match the marginal sum.
    debug_assert_eq!(
        quick_formula_scaled(taxable_income, regime),
        Some(cumulative_scaled)
    );

    let total_tax = cumulative_rounded as Vnd;
    let marginal_rate = rate_ratio(regime.brackets()[index].rate_bp);
    TaxBreakdown {
        taxable_income,
        total_tax,
        bracket: index + 1,
        effective_rate: total_tax as f64 / taxable_income as f64,
        marginal_rate,
        lines,
    }
}

/// Evaluates a taxable income supplied as a raw number, such as a
/// figure entered by hand.  Negative and non-finite amounts are taxed as
/// zero.
pub fn evaluate_taxable_amount(amount: f64, regime: &TaxRegime) -> TaxBreakdown {
    evaluate_tax(clamp_taxable(amount), regime)
}
