use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::catalog::{EntryId, ReviewerId, RubricCriterion};

/// Lifecycle state of a ballot. A ballot starts `Empty` when the balancer
/// hands the entry to a reviewer and moves through the states as the
/// reviewer works; `Done` ballots are the only ones that count toward an
/// entry's result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BallotStatus {
    Empty,
    Draft,
    Conflict,
    Done,
}

impl BallotStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Empty => "Empty ballot",
            Self::Draft => "Draft rating",
            Self::Conflict => "Conflict of interest or can't understand the language",
            Self::Done => "Completed rating",
        }
    }

    pub const fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Predicate replacements for the status-group queries: `Drafts` covers
/// everything still owed (empty and draft ballots alike).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    Drafts,
    Dones,
    Conflicts,
}

impl StatusFilter {
    pub const fn matches(self, status: BallotStatus) -> bool {
        matches!(
            (self, status),
            (Self::Drafts, BallotStatus::Empty)
                | (Self::Drafts, BallotStatus::Draft)
                | (Self::Dones, BallotStatus::Done)
                | (Self::Conflicts, BallotStatus::Conflict)
        )
    }
}

/// Nullable score per rubric criterion. Unset means the reviewer has not
/// scored that criterion yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub access: Option<i32>,
    pub quality: Option<i32>,
    pub visual: Option<i32>,
    pub engagement: Option<i32>,
    pub inclusion: Option<i32>,
    pub licensing: Option<i32>,
    pub accessibility: Option<i32>,
    pub currency: Option<i32>,
    pub individual: Option<i32>,
}

impl ScoreCard {
    pub fn get(&self, criterion: RubricCriterion) -> Option<i32> {
        match criterion {
            RubricCriterion::Access => self.access,
            RubricCriterion::Quality => self.quality,
            RubricCriterion::Visual => self.visual,
            RubricCriterion::Engagement => self.engagement,
            RubricCriterion::Inclusion => self.inclusion,
            RubricCriterion::Licensing => self.licensing,
            RubricCriterion::Accessibility => self.accessibility,
            RubricCriterion::Currency => self.currency,
            RubricCriterion::Individual => self.individual,
        }
    }

    pub fn set(&mut self, criterion: RubricCriterion, value: Option<i32>) {
        match criterion {
            RubricCriterion::Access => self.access = value,
            RubricCriterion::Quality => self.quality = value,
            RubricCriterion::Visual => self.visual = value,
            RubricCriterion::Engagement => self.engagement = value,
            RubricCriterion::Inclusion => self.inclusion = value,
            RubricCriterion::Licensing => self.licensing = value,
            RubricCriterion::Accessibility => self.accessibility = value,
            RubricCriterion::Currency => self.currency = value,
            RubricCriterion::Individual => self.individual = value,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Mean of the standard criteria that have a score, rounded to two
    /// decimals with ties to even. `None` until at least one standard
    /// criterion is scored; the individual score never participates.
    pub fn average(&self) -> Option<f64> {
        let scores: Vec<i32> = RubricCriterion::STANDARD
            .iter()
            .filter_map(|criterion| self.get(*criterion))
            .collect();

        if scores.is_empty() {
            return None;
        }

        let mean = f64::from(scores.iter().sum::<i32>()) / scores.len() as f64;
        Some((mean * 100.0).round_ties_even() / 100.0)
    }
}

/// One reviewer's ballot for one entry. The `(entry_id, reviewer_id)` pair
/// is unique across the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ballot {
    pub entry_id: EntryId,
    pub reviewer_id: ReviewerId,
    pub scores: ScoreCard,
    pub comment: String,
    pub status: BallotStatus,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Ballot {
    /// A fresh assignment: no scores, no comment, status `Empty`.
    pub fn empty(entry_id: EntryId, reviewer_id: ReviewerId, now: DateTime<Utc>) -> Self {
        Self {
            entry_id,
            reviewer_id,
            scores: ScoreCard::default(),
            comment: String::new(),
            status: BallotStatus::Empty,
            created: now,
            updated: now,
        }
    }

    pub fn average(&self) -> Option<f64> {
        self.scores.average()
    }

    /// Whether the ballot still occupies an assignment slot that staff may
    /// reclaim. Completed ballots are settled work and stay put.
    pub fn is_live(&self) -> bool {
        !self.status.is_done()
    }
}
