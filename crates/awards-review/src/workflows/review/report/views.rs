use chrono::{DateTime, Utc};
use serde::Serialize;

use super::super::domain::{Ballot, BallotStatus, ScoreCard};
use crate::workflows::catalog::{EntryDetail, EntryId, ReviewerId, RubricCriterion, RubricKind};

/// A ballot as exposed to its reviewer.
#[derive(Debug, Clone, Serialize)]
pub struct BallotView {
    pub entry_id: EntryId,
    pub reviewer_id: ReviewerId,
    pub status: BallotStatus,
    pub status_label: &'static str,
    pub scores: ScoreCard,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,
    pub updated: DateTime<Utc>,
}

impl BallotView {
    pub fn from_ballot(ballot: &Ballot) -> Self {
        Self {
            entry_id: ballot.entry_id,
            reviewer_id: ballot.reviewer_id,
            status: ballot.status,
            status_label: ballot.status.label(),
            scores: ballot.scores,
            comment: ballot.comment.clone(),
            average: ballot.average(),
            updated: ballot.updated,
        }
    }
}

/// One rubric criterion with its form copy, for clients rendering the form.
#[derive(Debug, Clone, Serialize)]
pub struct CriterionView {
    pub criterion: RubricCriterion,
    pub label: &'static str,
    pub description: &'static str,
}

impl CriterionView {
    pub fn for_rubric(rubric: RubricKind) -> Vec<Self> {
        rubric
            .criteria()
            .iter()
            .map(|criterion| Self {
                criterion: *criterion,
                label: criterion.label(),
                description: criterion.description(),
            })
            .collect()
    }
}

/// Everything the review screen needs for one entry: the detail fields the
/// caller may see, the rubric to render, and the caller's ballot if any.
#[derive(Debug, Clone, Serialize)]
pub struct EntryReviewView {
    pub detail: EntryDetail,
    pub criteria: Vec<CriterionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ballot: Option<BallotView>,
}

/// One row in a reviewer's queue.
#[derive(Debug, Clone, Serialize)]
pub struct QueueItemView {
    pub entry_id: EntryId,
    pub title: String,
    pub category: String,
    pub subcategory: String,
    pub status: BallotStatus,
    pub status_label: &'static str,
    pub updated: DateTime<Utc>,
}

/// A reviewer's ballots grouped the way the review screen lists them:
/// still-owed work first, then completed, then conflicts.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewerQueueView {
    pub drafts: Vec<QueueItemView>,
    pub dones: Vec<QueueItemView>,
    pub conflicts: Vec<QueueItemView>,
}

/// Round-wide ballot counts for the staff landing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProgressSummaryView {
    pub drafts: usize,
    pub dones: usize,
    pub conflicts: usize,
}

/// Per-reviewer progress counts.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewerProgressEntry {
    pub reviewer_id: ReviewerId,
    pub name: String,
    pub drafts: usize,
    pub dones: usize,
    pub conflicts: usize,
}

/// One reviewer slot in the assignment matrix.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewerSlotView {
    pub reviewer_id: ReviewerId,
    pub name: String,
    /// Whether the reviewer currently holds a live (non-done) ballot.
    pub assigned: bool,
}

/// One matrix row: an entry and every assignable reviewer's slot on it.
#[derive(Debug, Clone, Serialize)]
pub struct EntryAssignmentsView {
    pub entry_id: EntryId,
    pub title: String,
    pub category: String,
    pub subcategory: String,
    pub reviewers: Vec<ReviewerSlotView>,
}
