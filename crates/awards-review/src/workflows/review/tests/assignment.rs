use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::common::{entry, reviewer, staff_reviewer};
use crate::workflows::catalog::{Entry, EntryId, Reviewer, ReviewerId};
use crate::workflows::review::assignment::{self, AssignmentError, AssignmentPlan};

fn entries(count: i64) -> Vec<Entry> {
    (1..=count)
        .map(|id| entry(id, "Open Resource Awards", "Textbook", &format!("Entry {id}")))
        .collect()
}

fn pool(count: i64) -> Vec<Reviewer> {
    (1..=count)
        .map(|id| reviewer(id, &format!("Reviewer{id}"), "Pool"))
        .collect()
}

fn assert_balanced(plan: &AssignmentPlan, entry_count: usize, reviews: u32) {
    assert_eq!(plan.ballots.len(), entry_count * reviews as usize);

    let mut per_entry: HashMap<EntryId, HashSet<ReviewerId>> = HashMap::new();
    for ballot in &plan.ballots {
        assert!(
            per_entry
                .entry(ballot.entry_id)
                .or_default()
                .insert(ballot.reviewer_id),
            "reviewer drawn twice for the same entry"
        );
    }
    for assigned in per_entry.values() {
        assert_eq!(assigned.len(), reviews as usize);
    }

    for load in &plan.reviewer_load {
        assert!(load.ballots <= plan.fair_share_cap);
    }
    let total: u32 = plan.reviewer_load.iter().map(|load| load.ballots).sum();
    assert_eq!(total as usize, plan.ballots.len());
}

#[test]
fn three_reviews_over_three_reviewers_spread_evenly() {
    for seed in 0..8 {
        let mut rng = StdRng::seed_from_u64(seed);
        let plan =
            assignment::plan(&entries(10), &pool(3), 3, &mut rng).expect("pool covers the quota");

        assert_eq!(plan.fair_share_cap, 10);
        assert_eq!(plan.entry_count, 10);
        assert_eq!(plan.reviewer_count, 3);
        assert_balanced(&plan, 10, 3);
        for load in &plan.reviewer_load {
            assert_eq!(load.ballots, 10);
        }
    }
}

#[test]
fn loads_never_exceed_the_fair_share_cap() {
    for seed in 0..32 {
        let mut rng = StdRng::seed_from_u64(seed);
        match assignment::plan(&entries(7), &pool(4), 2, &mut rng) {
            Ok(plan) => {
                // ceil(7 * 2 / 4)
                assert_eq!(plan.fair_share_cap, 4);
                assert_balanced(&plan, 7, 2);
            }
            // A tight pool can paint itself into a corner; the run then
            // aborts instead of handing anyone extra ballots.
            Err(AssignmentError::InsufficientReviewers { .. }) => {}
        }
    }
}

#[test]
fn plans_are_deterministic_for_a_seed() {
    let first = assignment::plan(&entries(6), &pool(4), 2, &mut StdRng::seed_from_u64(11));
    let second = assignment::plan(&entries(6), &pool(4), 2, &mut StdRng::seed_from_u64(11));
    assert_eq!(first, second);
}

#[test]
fn staff_and_inactive_reviewers_never_draw_ballots() {
    let mut reviewers = pool(3);
    reviewers.push(staff_reviewer(8, "Sol", "Marchetti"));
    let mut retired = reviewer(9, "Ira", "Okafor");
    retired.active = false;
    reviewers.push(retired);

    let plan = assignment::plan(&entries(4), &reviewers, 3, &mut StdRng::seed_from_u64(3))
        .expect("three assignable reviewers cover three reviews per entry");

    assert_eq!(plan.reviewer_count, 3);
    for ballot in &plan.ballots {
        assert!(ballot.reviewer_id.0 <= 3);
    }
    for load in &plan.reviewer_load {
        assert!(load.reviewer_id.0 <= 3);
    }
}

#[test]
fn an_empty_catalog_yields_an_empty_plan() {
    let plan = assignment::plan(&[], &pool(3), 3, &mut StdRng::seed_from_u64(0))
        .expect("nothing to assign");

    assert_eq!(plan.entry_count, 0);
    assert_eq!(plan.fair_share_cap, 0);
    assert!(plan.ballots.is_empty());
    assert_eq!(plan.reviewer_load.len(), 3);
    assert!(plan.reviewer_load.iter().all(|load| load.ballots == 0));
    assert_eq!(plan.average_load(), 0.0);
}

#[test]
fn an_empty_pool_fails_on_the_first_entry() {
    let err = assignment::plan(&entries(2), &[], 3, &mut StdRng::seed_from_u64(0))
        .expect_err("no reviewers to draw from");
    assert_eq!(
        err,
        AssignmentError::InsufficientReviewers {
            entry: EntryId(1),
            needed: 3,
            available: 0,
        }
    );

    let staff_only = vec![staff_reviewer(1, "Sol", "Marchetti")];
    assert!(assignment::plan(&entries(2), &staff_only, 3, &mut StdRng::seed_from_u64(0)).is_err());
}

#[test]
fn a_quota_above_the_pool_size_always_aborts() {
    for seed in 0..8 {
        let err = assignment::plan(&entries(1), &pool(3), 4, &mut StdRng::seed_from_u64(seed))
            .expect_err("four distinct reviewers cannot come out of three");
        assert_eq!(
            err,
            AssignmentError::InsufficientReviewers {
                entry: EntryId(1),
                needed: 1,
                available: 3,
            }
        );
        assert!(err
            .to_string()
            .contains("entry #1 needs 1 more reviewer(s)"));
    }
}
