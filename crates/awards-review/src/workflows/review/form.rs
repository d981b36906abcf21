use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::domain::ScoreCard;
use crate::workflows::catalog::{RubricCriterion, RubricKind};

/// A rubric submission as posted by a reviewer. Scores outside the entry's
/// rubric variant are ignored; `comment` left out keeps the stored comment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BallotForm {
    #[serde(default)]
    pub scores: ScoreCard,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(default)]
    pub is_conflict: bool,
}

impl BallotForm {
    /// Validates the submission against the entry's rubric variant.
    ///
    /// Conflict declarations skip validation entirely: the scores are about
    /// to be discarded. Drafts only range-check what was provided; a final
    /// submission additionally requires every criterion of the variant.
    pub fn validate(&self, rubric: RubricKind, scale_max: i32) -> Result<(), ValidationError> {
        if self.is_conflict {
            return Ok(());
        }

        for criterion in rubric.criteria() {
            if let Some(value) = self.scores.get(*criterion) {
                if !(1..=scale_max).contains(&value) {
                    return Err(ValidationError::ScoreOutOfRange {
                        criterion: *criterion,
                        value,
                        max: scale_max,
                    });
                }
            }
        }

        if self.is_draft {
            return Ok(());
        }

        let missing: Vec<RubricCriterion> = rubric
            .criteria()
            .iter()
            .copied()
            .filter(|criterion| self.scores.get(*criterion).is_none())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::MissingScores(missing))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", missing_scores_message(.0))]
    MissingScores(Vec<RubricCriterion>),
    #[error("score for {} must be between 1 and {max}, got {value}", .criterion.label())]
    ScoreOutOfRange {
        criterion: RubricCriterion,
        value: i32,
        max: i32,
    },
}

fn missing_scores_message(missing: &[RubricCriterion]) -> String {
    let labels: Vec<&str> = missing.iter().map(|criterion| criterion.label()).collect();
    format!("a score is required for: {}", labels.join(", "))
}
