//! Year-end personal income tax settlement.
//!
//! Income from every employment span of the year is pooled, insurance
//! and family deductions are subtracted, and the annual tax is
//! recomputed from the monthly bracket table: the annual taxable income
//! is averaged per month, evaluated, and the monthly tax multiplied by
//! twelve.  The result is compared with the tax already withheld.

use crate::deductions::annual_deductions;
use crate::models::IncomeSource;
use crate::money::{round_div, Vnd};
use crate::regime::TaxRegime;
use crate::tax::{evaluate_tax, BracketLine};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Differences within this many dong are treated as settled.
pub const SETTLEMENT_THRESHOLD: Vnd = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    Child,
    Spouse,
    Parent,
    Other,
}

/// Registration details of a dependent as entered by the taxpayer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentRegistration {
    pub name: String,
    #[serde(default)]
    pub tax_code: String,
    pub relationship: Relationship,
    pub registered_from: NaiveDate,
    /// `None` while the registration is still open.
    #[serde(default)]
    pub registered_to: Option<NaiveDate>,
    /// Defaults to the year the registration starts.
    #[serde(default)]
    pub tax_year: Option<i32>,
}

/// A registered dependent for one settlement year.
///
/// `months_registered` is derived from the registration window clipped
/// to the tax year and is recomputed whenever the window or year
/// changes; it cannot be set directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DependentRegistration")]
pub struct TaxSettlementDependent {
    name: String,
    tax_code: String,
    relationship: Relationship,
    registered_from: NaiveDate,
    registered_to: Option<NaiveDate>,
    tax_year: i32,
    months_registered: u32,
}

impl From<DependentRegistration> for TaxSettlementDependent {
    fn from(reg: DependentRegistration) -> Self {
        let mut dependent = Self {
            name: reg.name,
            tax_code: reg.tax_code,
            relationship: reg.relationship,
            registered_from: reg.registered_from,
            registered_to: reg.registered_to,
            tax_year: reg.tax_year.unwrap_or_else(|| reg.registered_from.year()),
            months_registered: 0,
        };
        dependent.recompute();
        dependent
    }
}

impl TaxSettlementDependent {
    pub fn new(
        name: impl Into<String>,
        relationship: Relationship,
        registered_from: NaiveDate,
        registered_to: Option<NaiveDate>,
        tax_year: i32,
    ) -> Self {
        DependentRegistration {
            name: name.into(),
            tax_code: String::new(),
            relationship,
            registered_from,
            registered_to,
            tax_year: Some(tax_year),
        }
        .into()
    }

    pub fn with_tax_code(mut self, tax_code: impl Into<String>) -> Self {
        self.tax_code = tax_code.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tax_code(&self) -> &str {
        &self.tax_code
    }

    pub fn relationship(&self) -> Relationship {
        self.relationship
    }

    pub fn registered_from(&self) -> NaiveDate {
        self.registered_from
    }

    pub fn registered_to(&self) -> Option<NaiveDate> {
        self.registered_to
    }

    pub fn tax_year(&self) -> i32 {
        self.tax_year
    }

    pub fn months_registered(&self) -> u32 {
        self.months_registered
    }

    pub fn set_registration_window(&mut self, from: NaiveDate, to: Option<NaiveDate>) {
        self.registered_from = from;
        self.registered_to = to;
        self.recompute();
    }

    pub fn set_tax_year(&mut self, year: i32) {
        self.tax_year = year;
        self.recompute();
    }

    /// Months of `year` covered by the registration window, counting
    /// both the starting and the ending month.
    pub fn months_registered_in(&self, year: i32) -> u32 {
        let month_index = |date: NaiveDate| date.year() * 12 + date.month0() as i32;
        let first = month_index(self.registered_from).max(year * 12);
        let last = self
            .registered_to
            .map_or(year * 12 + 11, month_index)
            .min(year * 12 + 11);
        (last - first + 1).clamp(0, 12) as u32
    }

    fn recompute(&mut self) {
        self.months_registered = self.months_registered_in(self.tax_year);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementType {
    /// The taxpayer overpaid and is owed money back.
    Refund,
    /// The taxpayer underpaid and owes the difference.
    Payment,
    Even,
}

impl SettlementType {
    pub fn classify(settlement_amount: Vnd) -> Self {
        if settlement_amount > SETTLEMENT_THRESHOLD {
            Self::Refund
        } else if settlement_amount < -SETTLEMENT_THRESHOLD {
            Self::Payment
        } else {
            Self::Even
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeductionBreakdown {
    pub insurance: Vnd,
    pub personal: Vnd,
    pub dependents: Vnd,
    /// Registered dependent-months across all dependents.
    pub dependent_months: u32,
    pub total: Vnd,
}

/// Per-source echo of the pooled amounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSummary {
    pub employer: String,
    pub income: Vnd,
    pub insurance_paid: Vnd,
    pub tax_withheld: Vnd,
}

#[derive(Debug, Default)]
struct SourceTotals {
    income: Vnd,
    insurance: Vnd,
    withheld: Vnd,
}

/// Snapshot of one settlement run.
///
/// Built once by [`reconcile_settlement`] and read through accessors; a
/// new run produces a new value rather than updating this one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaxSettlementCalculation {
    year: i32,
    total_income: Vnd,
    total_deductions: Vnd,
    taxable_income: Vnd,
    calculated_tax: Vnd,
    paid_tax: Vnd,
    settlement_amount: Vnd,
    settlement_type: SettlementType,
    tax_breakdown: Vec<BracketLine>,
    deduction_breakdown: DeductionBreakdown,
    sources: Vec<SourceSummary>,
}

impl TaxSettlementCalculation {
    fn empty(year: i32) -> Self {
        Self {
            year,
            total_income: 0,
            total_deductions: 0,
            taxable_income: 0,
            calculated_tax: 0,
            paid_tax: 0,
            settlement_amount: 0,
            settlement_type: SettlementType::Even,
            tax_breakdown: Vec::new(),
            deduction_breakdown: DeductionBreakdown::default(),
            sources: Vec::new(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn total_income(&self) -> Vnd {
        self.total_income
    }

    pub fn total_deductions(&self) -> Vnd {
        self.total_deductions
    }

    pub fn taxable_income(&self) -> Vnd {
        self.taxable_income
    }

    pub fn calculated_tax(&self) -> Vnd {
        self.calculated_tax
    }

    pub fn paid_tax(&self) -> Vnd {
        self.paid_tax
    }

    /// Withheld minus owed: positive means a refund.
    pub fn settlement_amount(&self) -> Vnd {
        self.settlement_amount
    }

    pub fn settlement_type(&self) -> SettlementType {
        self.settlement_type
    }

    /// Annualised per-bracket tax; sums to [`Self::calculated_tax`].
    pub fn tax_breakdown(&self) -> &[BracketLine] {
        &self.tax_breakdown
    }

    pub fn deduction_breakdown(&self) -> &DeductionBreakdown {
        &self.deduction_breakdown
    }

    pub fn sources(&self) -> &[SourceSummary] {
        &self.sources
    }
}

/// Reconciles a tax year's income sources against withheld tax.
///
/// With no income sources there is nothing to settle and an all-zero
/// `Even` result is returned.
pub fn reconcile_settlement(
    sources: &[IncomeSource],
    dependents: &[TaxSettlementDependent],
    regime: &TaxRegime,
) -> TaxSettlementCalculation {
    let year = regime.year();
    if sources.is_empty() {
        return TaxSettlementCalculation::empty(year);
    }

    let totals = sources.iter().fold(SourceTotals::default(), |acc, source| SourceTotals {
        income: acc.income + source.total_income(),
        insurance: acc.insurance + source.insurance_paid,
        withheld: acc.withheld + source.tax_withheld,
    });

    let dependent_months: u32 = dependents.iter().map(|d| d.months_registered_in(year)).sum();
    let family = annual_deductions(dependent_months, regime);
    let deduction_breakdown = DeductionBreakdown {
        insurance: totals.insurance,
        personal: family.personal,
        dependents: family.dependents,
        dependent_months,
        total: totals.insurance + family.total,
    };

    let taxable_income = (totals.income - deduction_breakdown.total).max(0);
    let monthly_taxable = round_div(taxable_income as i128, 12) as Vnd;
    let annual_tax = evaluate_tax(monthly_taxable, regime).scaled(12);
    let calculated_tax = annual_tax.total_tax;
    let settlement_amount = totals.withheld - calculated_tax;

    debug!(
        year,
        total_income = totals.income,
        taxable_income,
        calculated_tax,
        paid_tax = totals.withheld,
        "reconciled settlement"
    );

    TaxSettlementCalculation {
        year,
        total_income: totals.income,
        total_deductions: deduction_breakdown.total,
        taxable_income,
        calculated_tax,
        paid_tax: totals.withheld,
        settlement_amount,
        settlement_type: SettlementType::classify(settlement_amount),
        tax_breakdown: annual_tax.lines,
        deduction_breakdown,
        sources: sources
            .iter()
            .map(|s| SourceSummary {
                employer: s.employer.clone(),
                income: s.total_income(),
                insurance_paid: s.insurance_paid,
                tax_withheld: s.tax_withheld,
            })
            .collect(),
    }
}
