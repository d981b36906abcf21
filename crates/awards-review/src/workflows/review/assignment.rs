use std::collections::BTreeMap;

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::workflows::catalog::{Entry, EntryId, Reviewer, ReviewerId};

/// One (entry, reviewer) pairing produced by the balancer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedBallot {
    pub entry_id: EntryId,
    pub reviewer_id: ReviewerId,
}

/// How many ballots one reviewer picked up in a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReviewerLoad {
    pub reviewer_id: ReviewerId,
    pub ballots: u32,
}

/// A complete balanced assignment over the current catalog. Producing the
/// plan never touches storage; committing it is a separate step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignmentPlan {
    pub reviews_per_entry: u32,
    pub fair_share_cap: u32,
    pub entry_count: usize,
    pub reviewer_count: usize,
    pub ballots: Vec<PlannedBallot>,
    pub reviewer_load: Vec<ReviewerLoad>,
}

impl AssignmentPlan {
    /// Mean ballots per reviewer, for operator output.
    pub fn average_load(&self) -> f64 {
        if self.reviewer_count == 0 {
            return 0.0;
        }
        self.ballots.len() as f64 / self.reviewer_count as f64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssignmentError {
    #[error(
        "entry #{} needs {needed} more reviewer(s) but only {available} remain under the fair-share cap",
        .entry.0
    )]
    InsufficientReviewers {
        entry: EntryId,
        needed: u32,
        available: usize,
    },
}

/// Distributes `reviews_per_entry` distinct reviewers to every entry.
///
/// Reviewers are drawn at random from the assignable pool (active,
/// non-staff). Nobody is handed more than the fair-share cap
/// `ceil(entries * reviews_per_entry / pool_size)`: once a reviewer reaches
/// the cap they drop out of the draw for later entries. If an entry cannot
/// reach its quota of distinct reviewers the whole plan is abandoned, so a
/// failed run never produces a partial assignment.
pub fn plan(
    entries: &[Entry],
    reviewers: &[Reviewer],
    reviews_per_entry: u32,
    rng: &mut impl Rng,
) -> Result<AssignmentPlan, AssignmentError> {
    let pool: Vec<ReviewerId> = reviewers
        .iter()
        .filter(|reviewer| reviewer.assignable())
        .map(|reviewer| reviewer.id)
        .collect();

    if entries.is_empty() {
        return Ok(AssignmentPlan {
            reviews_per_entry,
            fair_share_cap: 0,
            entry_count: 0,
            reviewer_count: pool.len(),
            ballots: Vec::new(),
            reviewer_load: pool
                .iter()
                .map(|id| ReviewerLoad {
                    reviewer_id: *id,
                    ballots: 0,
                })
                .collect(),
        });
    }

    if pool.is_empty() {
        return Err(AssignmentError::InsufficientReviewers {
            entry: entries[0].id,
            needed: reviews_per_entry,
            available: 0,
        });
    }

    let fair_share_cap = fair_share(entries.len(), reviews_per_entry, pool.len());

    let mut working = pool.clone();
    let mut counts: BTreeMap<ReviewerId, u32> = pool.iter().map(|id| (*id, 0)).collect();
    let mut ballots = Vec::with_capacity(entries.len() * reviews_per_entry as usize);

    for entry in entries {
        let mut assigned: Vec<ReviewerId> = Vec::with_capacity(reviews_per_entry as usize);

        for _ in 0..reviews_per_entry {
            // Same reviewer only once per entry, so the draw runs over the
            // under-cap pool minus whoever already holds this entry.
            let candidates: Vec<ReviewerId> = working
                .iter()
                .copied()
                .filter(|id| !assigned.contains(id))
                .collect();

            if candidates.is_empty() {
                return Err(AssignmentError::InsufficientReviewers {
                    entry: entry.id,
                    needed: reviews_per_entry - assigned.len() as u32,
                    available: working.len(),
                });
            }

            let pick = candidates[rng.gen_range(0..candidates.len())];
            ballots.push(PlannedBallot {
                entry_id: entry.id,
                reviewer_id: pick,
            });
            *counts.entry(pick).or_insert(0) += 1;
            assigned.push(pick);
        }

        working.retain(|id| counts.get(id).copied().unwrap_or(0) < fair_share_cap);
    }

    let reviewer_load = counts
        .iter()
        .map(|(reviewer_id, ballots)| ReviewerLoad {
            reviewer_id: *reviewer_id,
            ballots: *ballots,
        })
        .collect();

    Ok(AssignmentPlan {
        reviews_per_entry,
        fair_share_cap,
        entry_count: entries.len(),
        reviewer_count: pool.len(),
        ballots,
        reviewer_load,
    })
}

fn fair_share(entries: usize, reviews_per_entry: u32, pool_size: usize) -> u32 {
    let total = entries as u64 * u64::from(reviews_per_entry);
    let pool = pool_size as u64;
    ((total + pool - 1) / pool) as u32
}
