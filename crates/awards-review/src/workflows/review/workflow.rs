use chrono::{DateTime, Utc};

use super::domain::{Ballot, BallotStatus};
use super::form::{BallotForm, ValidationError};
use crate::workflows::catalog::RubricKind;

/// Applies a rubric submission to a ballot and returns the resulting status.
///
/// A conflict declaration wipes every stored score and parks the ballot in
/// `Conflict`; saving over it later works like any other submission. Drafts
/// and final submissions replace the variant's scores wholesale, so clearing
/// a criterion in the form clears it on the ballot too. Completed ballots
/// stay editable and simply run through the same transitions again.
pub fn apply_submission(
    ballot: &mut Ballot,
    form: &BallotForm,
    rubric: RubricKind,
    scale_max: i32,
    now: DateTime<Utc>,
) -> Result<BallotStatus, ValidationError> {
    form.validate(rubric, scale_max)?;

    if form.is_conflict {
        ballot.scores.clear();
        ballot.status = BallotStatus::Conflict;
    } else {
        for criterion in rubric.criteria() {
            ballot.scores.set(*criterion, form.scores.get(*criterion));
        }
        ballot.status = if form.is_draft {
            BallotStatus::Draft
        } else {
            BallotStatus::Done
        };
    }

    if let Some(comment) = &form.comment {
        ballot.comment = comment.clone();
    }
    ballot.updated = now;

    Ok(ballot.status)
}
