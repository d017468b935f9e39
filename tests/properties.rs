//! Property tests for the calculation core across both shipped regimes.

use proptest::prelude::*;
use vn_wage_engine::models::{Benefits, Compensation, JobOffer, SalaryInput, UserPriorities, WorkLife};
use vn_wage_engine::offers::{rank_offers, score_offer};
use vn_wage_engine::salary::{gross_to_net, net_to_gross, NET_TOLERANCE};
use vn_wage_engine::settlement::{reconcile_settlement, SettlementType};
use vn_wage_engine::tax::{evaluate_tax, quick_formula_tax};
use vn_wage_engine::{TaxRegime, Vnd};

fn regime() -> impl Strategy<Value = TaxRegime> {
    prop_oneof![Just(TaxRegime::vn_2025()), Just(TaxRegime::vn_2026())]
}

fn offer_strategy() -> impl Strategy<Value = JobOffer> {
    (
        "[a-z]{1,8}",
        5_000_000i64..150_000_000,
        0i64..3_000_000,
        3u32..=6,
        0u32..=5,
        0u32..=30,
    )
        .prop_map(|(id, base_salary, meal, days, remote, leave)| JobOffer {
            id,
            compensation: Compensation {
                base_salary,
                ..Default::default()
            },
            benefits: Benefits {
                meal_allowance: meal,
                ..Default::default()
            },
            work_life: WorkLife {
                working_days_per_week: days,
                remote_days_per_week: remote,
                annual_leave_days: leave,
                ..Default::default()
            },
            ..Default::default()
        })
}

fn priorities_strategy() -> impl Strategy<Value = UserPriorities> {
    (1u8..=10, 1u8..=10, 1u8..=10, 1u8..=10, 1u8..=10, 1u8..=10).prop_map(
        |(salary, bonuses, benefits, work_life_balance, career, commute)| UserPriorities {
            salary,
            bonuses,
            benefits,
            work_life_balance,
            career,
            commute,
        },
    )
}

proptest! {
    /// Gross always splits exactly into net, insurance and tax.
    #[test]
    fn gross_reconciles_with_components(
        regime in regime(),
        gross in 0i64..2_000_000_000,
        dependents in 0u32..5,
    ) {
        let result = gross_to_net(&SalaryInput::new(gross, dependents), &regime);
        prop_assert_eq!(result.gross, result.net + result.contributions.total + result.tax.total_tax);
        prop_assert!(result.tax.taxable_income >= 0);
    }

    /// The quick formula agrees with the per-bracket decomposition.
    #[test]
    fn quick_formula_matches_bracket_lines(regime in regime(), taxable in -1_000_000i64..5_000_000_000) {
        let tax = evaluate_tax(taxable, &regime);
        let line_sum: Vnd = tax.lines.iter().map(|l| l.tax).sum();
        prop_assert_eq!(line_sum, tax.total_tax);
        prop_assert_eq!(quick_formula_tax(taxable, &regime), tax.total_tax);
    }

    /// Net to gross and back reproduces the requested net.
    #[test]
    fn net_to_gross_round_trip(
        regime in regime(),
        net in 1i64..500_000_000,
        dependents in 0u32..4,
    ) {
        let solved = net_to_gross(&SalaryInput::new(net, dependents), &regime).unwrap();
        let forward = gross_to_net(&SalaryInput::new(solved.gross, dependents), &regime);
        prop_assert!((forward.net - net).abs() <= NET_TOLERANCE);
    }

    /// Net never decreases as gross grows.
    #[test]
    fn net_is_monotone_in_gross(
        regime in regime(),
        low in 0i64..1_000_000_000,
        step in 1i64..10_000_000,
        dependents in 0u32..4,
    ) {
        let a = gross_to_net(&SalaryInput::new(low, dependents), &regime);
        let b = gross_to_net(&SalaryInput::new(low + step, dependents), &regime);
        prop_assert!(a.net <= b.net);
    }

    /// One extra dong of gross never costs more than it adds, even where
    /// several insurance lines round up at once.
    #[test]
    fn net_is_monotone_per_dong(
        regime in regime(),
        gross in 0i64..200_000_000,
        dependents in 0u32..4,
    ) {
        let a = gross_to_net(&SalaryInput::new(gross, dependents), &regime);
        let b = gross_to_net(&SalaryInput::new(gross + 1, dependents), &regime);
        prop_assert!(a.net <= b.net);
        prop_assert!(b.net - a.net <= 1);
    }

    /// Ranking is deterministic and an offer's score does not depend on
    /// where it appears in the list.
    #[test]
    fn ranking_is_deterministic_and_order_independent(
        offers in prop::collection::vec(offer_strategy(), 2..6),
        priorities in priorities_strategy(),
    ) {
        let first = rank_offers(&offers, &priorities);
        let second = rank_offers(&offers, &priorities);
        prop_assert_eq!(&first, &second);

        let mut reversed = offers.clone();
        reversed.reverse();
        let flipped = rank_offers(&reversed, &priorities);
        for (index, entry) in first.overall.iter().enumerate() {
            prop_assert_eq!(entry.rank, index + 1);
            prop_assert_eq!(entry.breakdown, score_offer(&entry.offer));
        }
        for offer in &offers {
            let score_in = |ranking: &vn_wage_engine::offers::OfferRanking| {
                ranking
                    .overall
                    .iter()
                    .find(|e| &e.offer == offer)
                    .map(|e| e.score)
            };
            prop_assert_eq!(score_in(&first), score_in(&flipped));
        }
        for pair in first.overall.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
        }
    }
}

#[test]
fn zero_income_settlement_is_even() {
    for regime in [TaxRegime::vn_2025(), TaxRegime::vn_2026()] {
        let calc = reconcile_settlement(&[], &[], &regime);
        assert_eq!(calc.settlement_type(), SettlementType::Even);
        assert_eq!(calc.total_income(), 0);
        assert_eq!(calc.total_deductions(), 0);
        assert_eq!(calc.calculated_tax(), 0);
        assert_eq!(calc.paid_tax(), 0);
    }
}
