//! Family deductions.
//!
//! Monthly conversions deduct per dependent head; the year-end
//! settlement deducts per registered dependent-month.  The two are kept
//! as separate entry points so the units cannot be mixed up.

use crate::money::Vnd;
use crate::regime::TaxRegime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    pub personal: Vnd,
    pub dependents: Vnd,
    pub total: Vnd,
}

impl Deductions {
    fn new(personal: Vnd, dependents: Vnd) -> Self {
        Self {
            personal,
            dependents,
            total: personal + dependents,
        }
    }
}

/// Deductions for one month with `dependent_count` registered dependents.
pub fn monthly_deductions(dependent_count: u32, regime: &TaxRegime) -> Deductions {
    Deductions::new(
        regime.personal_deduction(),
        regime.dependent_deduction() * dependent_count as Vnd,
    )
}

/// Deductions for a whole tax year, given the summed registered months
/// across all dependents.
pub fn annual_deductions(dependent_months: u32, regime: &TaxRegime) -> Deductions {
    Deductions::new(
        regime.personal_deduction() * 12,
        regime.dependent_deduction() * dependent_months as Vnd,
    )
}
