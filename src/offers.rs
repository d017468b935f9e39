//! Job offer scoring and ranking.
//!
//! Every offer receives four subscores in `[0, 100]`, independent of the
//! user's priorities and of the other offers.  The overall score weights
//! them with the normalised priorities.  The `bonuses` and `commute`
//! priorities have no subscore of their own: bonuses and net commute
//! cost are already folded into the financial subscore, so those two
//! weights do not enter the total.
//!
//! Rankings sort by score descending with a stable sort, so offers with
//! equal scores keep their input order.

use crate::models::{CompanyStage, JobOffer, UserPriorities};
use crate::money::Vnd;
use serde::{Deserialize, Serialize};

/// Annual package that earns a full financial score.
pub const REFERENCE_ANNUAL_COMPENSATION: Vnd = 1_200_000_000;
/// Annual monetised benefits that earn a full benefits score.
pub const REFERENCE_ANNUAL_BENEFITS: Vnd = 60_000_000;

const MAX_SCORE: f64 = 100.0;
const BASELINE_SCORE: f64 = 50.0;

/// Priorities scaled from 1–10 into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPriorities {
    pub salary: f64,
    pub bonuses: f64,
    pub benefits: f64,
    pub work_life_balance: f64,
    pub career: f64,
    pub commute: f64,
}

impl From<&UserPriorities> for NormalizedPriorities {
    fn from(raw: &UserPriorities) -> Self {
        let scale = |weight: u8| f64::from(weight.min(10)) / 10.0;
        Self {
            salary: scale(raw.salary),
            bonuses: scale(raw.bonuses),
            benefits: scale(raw.benefits),
            work_life_balance: scale(raw.work_life_balance),
            career: scale(raw.career),
            commute: scale(raw.commute),
        }
    }
}

/// Priority-independent subscores of one offer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub financial: f64,
    pub benefits: f64,
    pub work_life_balance: f64,
    pub career: f64,
}

impl ScoreBreakdown {
    pub fn weighted_total(&self, weights: &NormalizedPriorities) -> f64 {
        self.financial * weights.salary
            + self.benefits * weights.benefits
            + self.work_life_balance * weights.work_life_balance
            + self.career * weights.career
    }
}

fn bounded(score: f64) -> f64 {
    score.clamp(0.0, MAX_SCORE)
}

/// Yearly cash value of an offer net of commute cost.
pub fn annual_financial_value(offer: &JobOffer) -> Vnd {
    let comp = &offer.compensation;
    let month13 = (comp.base_salary as f64 * comp.month13_months).round() as Vnd;
    comp.base_salary * 12 + month13 + comp.annual_bonus + comp.signing_bonus + comp.equity_annual_value
        - offer.commute.net_annual_cost()
}

/// Yearly monetised value of an offer's benefits.
pub fn annual_benefits_value(offer: &JobOffer) -> Vnd {
    let b = &offer.benefits;
    b.health_insurance_annual
        + 12 * (b.meal_allowance + b.transport_allowance + b.phone_allowance + b.internet_allowance + b.gym_allowance)
}

fn financial_score(offer: &JobOffer) -> f64 {
    bounded(annual_financial_value(offer) as f64 / REFERENCE_ANNUAL_COMPENSATION as f64 * MAX_SCORE)
}

fn benefits_score(offer: &JobOffer) -> f64 {
    bounded(annual_benefits_value(offer) as f64 / REFERENCE_ANNUAL_BENEFITS as f64 * MAX_SCORE)
}

fn work_life_score(offer: &JobOffer) -> f64 {
    let wl = &offer.work_life;
    let mut score = BASELINE_SCORE;
    if wl.working_days_per_week <= 4 {
        score += 15.0;
    }
    if wl.working_hours_per_day <= 7.0 {
        score += 10.0;
    } else if wl.working_hours_per_day <= 8.0 {
        score += 5.0;
    }
    score += 8.0 * wl.remote_days_per_week.min(5) as f64;
    score += match wl.annual_leave_days {
        20..=u32::MAX => 15.0,
        15..=19 => 10.0,
        12..=14 => 5.0,
        _ => 0.0,
    };
    bounded(score)
}

fn career_score(offer: &JobOffer) -> f64 {
    let career = &offer.career;
    let mut score = BASELINE_SCORE;
    if (5..=20).contains(&career.team_size) {
        score += 10.0;
    }
    if career.company_stage == CompanyStage::Startup {
        score += 10.0;
    }
    if career.high_growth {
        score += 10.0;
    }
    if offer.compensation.equity_annual_value > 0 {
        score += 10.0;
    }
    if career.training_budget_annual > 0 {
        score += 10.0;
    }
    bounded(score)
}

/// Scores one offer on its own.
pub fn score_offer(offer: &JobOffer) -> ScoreBreakdown {
    ScoreBreakdown {
        financial: financial_score(offer),
        benefits: benefits_score(offer),
        work_life_balance: work_life_score(offer),
        career: career_score(offer),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub offer: JobOffer,
    pub score: f64,
    /// 1-based.
    pub rank: usize,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryEntry {
    pub offer_id: String,
    pub score: f64,
    pub rank: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryRankings {
    pub financial: Vec<CategoryEntry>,
    pub benefits: Vec<CategoryEntry>,
    pub work_life_balance: Vec<CategoryEntry>,
    pub career: Vec<CategoryEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OfferRanking {
    pub overall: Vec<RankingEntry>,
    pub by_category: CategoryRankings,
}

/// Input positions ordered by score descending; ties keep input order.
fn stable_order(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|a, b| scores[*b].total_cmp(&scores[*a]));
    order
}

fn category_ranking(offers: &[JobOffer], scores: &[f64]) -> Vec<CategoryEntry> {
    stable_order(scores)
        .into_iter()
        .enumerate()
        .map(|(position, index)| CategoryEntry {
            offer_id: offers[index].id.clone(),
            score: scores[index],
            rank: position + 1,
        })
        .collect()
}

/// Ranks offers under the given priorities.
///
/// Fewer than two offers yield an empty ranking.
pub fn rank_offers(offers: &[JobOffer], priorities: &UserPriorities) -> OfferRanking {
    if offers.len() < 2 {
        return OfferRanking::default();
    }
    let weights = NormalizedPriorities::from(priorities);
    let breakdowns: Vec<ScoreBreakdown> = offers.iter().map(score_offer).collect();
    let totals: Vec<f64> = breakdowns.iter().map(|b| b.weighted_total(&weights)).collect();

    let overall = stable_order(&totals)
        .into_iter()
        .enumerate()
        .map(|(position, index)| RankingEntry {
            offer: offers[index].clone(),
            score: totals[index],
            rank: position + 1,
            breakdown: breakdowns[index],
        })
        .collect();

    let column = |pick: fn(&ScoreBreakdown) -> f64| -> Vec<f64> { breakdowns.iter().map(pick).collect() };
    let by_category = CategoryRankings {
        financial: category_ranking(offers, &column(|b| b.financial)),
        benefits: category_ranking(offers, &column(|b| b.benefits)),
        work_life_balance: category_ranking(offers, &column(|b| b.work_life_balance)),
        career: category_ranking(offers, &column(|b| b.career)),
    };

    OfferRanking { overall, by_category }
}
