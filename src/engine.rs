//! Request dispatch for the compensation engine.
//!
//! The `engine` module turns an [`EngineRequest`] into an
//! [`EngineResponse`] by resolving the tax regime for the requested
//! year and calling the matching calculation.  Every calculation is a
//! pure function of its input and a read-only regime, so independent
//! requests can be evaluated concurrently: [`run_batch`] uses the
//! [`rayon`] crate to spread a batch across CPU cores while keeping the
//! outcomes in input order.

use crate::annual::{aggregate_annual, AnnualCompensation};
use crate::error::EngineError;
use crate::models::{BonusInput, IncomeSource, JobOffer, SalaryInput, UserPriorities};
use crate::offers::{rank_offers, OfferRanking};
use crate::regime::RegimeTable;
use crate::salary::{compare_regimes, gross_to_net, net_to_gross, RegimeComparison, SalaryResult};
use crate::settlement::{reconcile_settlement, TaxSettlementCalculation, TaxSettlementDependent};
use crate::tax::{evaluate_taxable_amount, TaxBreakdown};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single calculation request, tagged by `operation`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum EngineRequest {
    /// Monthly tax on a taxable income given directly.
    Tax {
        year: i32,
        taxable_income: f64,
    },
    GrossToNet {
        year: i32,
        input: SalaryInput,
    },
    NetToGross {
        year: i32,
        input: SalaryInput,
    },
    Annual {
        year: i32,
        input: SalaryInput,
        #[serde(default)]
        bonuses: BonusInput,
    },
    Settlement {
        year: i32,
        #[serde(default)]
        sources: Vec<IncomeSource>,
        #[serde(default)]
        dependents: Vec<TaxSettlementDependent>,
    },
    RankOffers {
        offers: Vec<JobOffer>,
        #[serde(default)]
        priorities: UserPriorities,
    },
    CompareRegimes {
        from_year: i32,
        to_year: i32,
        input: SalaryInput,
    },
}

impl EngineRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Tax { .. } => "tax",
            Self::GrossToNet { .. } => "gross_to_net",
            Self::NetToGross { .. } => "net_to_gross",
            Self::Annual { .. } => "annual",
            Self::Settlement { .. } => "settlement",
            Self::RankOffers { .. } => "rank_offers",
            Self::CompareRegimes { .. } => "compare_regimes",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "operation", content = "result", rename_all = "snake_case")]
pub enum EngineResponse {
    Tax(TaxBreakdown),
    GrossToNet(SalaryResult),
    NetToGross(SalaryResult),
    Annual(AnnualCompensation),
    Settlement(TaxSettlementCalculation),
    RankOffers(OfferRanking),
    CompareRegimes(RegimeComparison),
}

/// Outcome of one request inside a batch.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchOutcome {
    Ok(EngineResponse),
    Err { error: String },
}

/// Evaluates one request against the loaded regimes.
pub fn run_request(request: EngineRequest, regimes: &RegimeTable) -> Result<EngineResponse, EngineError> {
    debug!(operation = request.operation(), "running request");
    let response = match request {
        EngineRequest::Tax { year, taxable_income } => {
            EngineResponse::Tax(evaluate_taxable_amount(taxable_income, &*regimes.get(year)?))
        }
        EngineRequest::GrossToNet { year, input } => {
            EngineResponse::GrossToNet(gross_to_net(&input, &*regimes.get(year)?))
        }
        EngineRequest::NetToGross { year, input } => {
            EngineResponse::NetToGross(net_to_gross(&input, &*regimes.get(year)?)?)
        }
        EngineRequest::Annual { year, input, bonuses } => {
            EngineResponse::Annual(aggregate_annual(&input, &bonuses, &*regimes.get(year)?))
        }
        EngineRequest::Settlement {
            year,
            sources,
            mut dependents,
        } => {
            let regime = regimes.get(year)?;
            for dependent in &mut dependents {
                dependent.set_tax_year(year);
            }
            EngineResponse::Settlement(reconcile_settlement(&sources, &dependents, &regime))
        }
        EngineRequest::RankOffers { offers, priorities } => {
            EngineResponse::RankOffers(rank_offers(&offers, &priorities))
        }
        EngineRequest::CompareRegimes {
            from_year,
            to_year,
            input,
        } => {
            let from = regimes.get(from_year)?;
            let to = regimes.get(to_year)?;
            EngineResponse::CompareRegimes(compare_regimes(&input, &from, &to))
        }
    };
    Ok(response)
}

/// Evaluates independent requests in parallel.  Outcomes are returned in
/// request order; a failing request does not affect the others.
pub fn run_batch(requests: Vec<EngineRequest>, regimes: &RegimeTable) -> Vec<BatchOutcome> {
    requests
        .into_par_iter()
        .map(|request| match run_request(request, regimes) {
            Ok(response) => BatchOutcome::Ok(response),
            Err(err) => BatchOutcome::Err { error: err.to_string() },
        })
        .collect()
}
