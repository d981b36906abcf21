use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use super::assignment::{self, AssignmentError, AssignmentPlan};
use super::domain::Ballot;
use super::form::{BallotForm, ValidationError};
use super::report::views::{
    BallotView, CriterionView, EntryAssignmentsView, EntryReviewView, ProgressSummaryView,
    ReviewerProgressEntry, ReviewerQueueView,
};
use super::report::{assignment_matrix, progress, reviewer_progress, reviewer_queue};
use super::repository::{BallotRepository, CatalogRepository, RepositoryError};
use super::workflow::apply_submission;
use crate::config::ReviewConfig;
use crate::workflows::catalog::{
    entry_detail, EntryBatch, EntryId, ReviewerId, ReviewerRecord,
};
use crate::workflows::review::report::export::{category_sheets, CategorySheet};

/// Error umbrella for the review workflow.
#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
}

/// What happened when staff toggled a reviewer on an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReassignmentOutcome {
    /// No ballot existed; a fresh empty one was created.
    Created,
    /// A live ballot (empty, draft, or conflict) was withdrawn.
    Removed,
    /// The ballot is completed work and was left untouched.
    KeptDone,
}

impl ReassignmentOutcome {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Created => "ballot created",
            Self::Removed => "ballot removed",
            Self::KeptDone => "completed ballot kept",
        }
    }
}

/// Result of one balancer run.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentRun {
    pub committed: bool,
    pub plan: AssignmentPlan,
}

/// Outcome of a reviewer sheet import.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProvisionOutcome {
    pub created: usize,
    pub skipped: usize,
}

/// Service composing the catalog and ballot stores with the balancer and
/// the rating workflow.
pub struct ReviewService<C, B> {
    catalog: Arc<C>,
    ballots: Arc<B>,
    config: ReviewConfig,
}

impl<C, B> ReviewService<C, B>
where
    C: CatalogRepository + 'static,
    B: BallotRepository + 'static,
{
    pub fn new(catalog: Arc<C>, ballots: Arc<B>, config: ReviewConfig) -> Self {
        Self {
            catalog,
            ballots,
            config,
        }
    }

    /// Applies a rubric submission to the caller's ballot on `entry`.
    pub fn submit_rating(
        &self,
        reviewer: ReviewerId,
        entry: EntryId,
        form: &BallotForm,
    ) -> Result<BallotView, ReviewServiceError> {
        let entry_record = self
            .catalog
            .entry(entry)?
            .ok_or(RepositoryError::NotFound)?;
        let mut ballot = self
            .ballots
            .fetch(entry, reviewer)?
            .ok_or(RepositoryError::NotFound)?;

        apply_submission(
            &mut ballot,
            form,
            entry_record.category.rubric,
            self.config.score_scale_max,
            Utc::now(),
        )?;
        self.ballots.update(ballot.clone())?;

        Ok(BallotView::from_ballot(&ballot))
    }

    /// Assembles the review screen for one entry. Regular reviewers only
    /// reach entries they hold a ballot for; staff may inspect any entry.
    pub fn entry_for_review(
        &self,
        reviewer: ReviewerId,
        staff: bool,
        entry: EntryId,
    ) -> Result<EntryReviewView, ReviewServiceError> {
        let entry_record = self
            .catalog
            .entry(entry)?
            .ok_or(RepositoryError::NotFound)?;
        let ballot = self.ballots.fetch(entry, reviewer)?;

        if ballot.is_none() && !staff {
            return Err(RepositoryError::NotFound.into());
        }

        Ok(EntryReviewView {
            detail: entry_detail(&entry_record, staff),
            criteria: CriterionView::for_rubric(entry_record.category.rubric),
            ballot: ballot.as_ref().map(BallotView::from_ballot),
        })
    }

    /// The caller's ballots grouped drafts/dones/conflicts.
    pub fn queue(&self, reviewer: ReviewerId) -> Result<ReviewerQueueView, ReviewServiceError> {
        let entries = self.catalog.entries()?;
        let ballots = self.ballots.for_reviewer(reviewer)?;
        Ok(reviewer_queue(reviewer, &entries, &ballots))
    }

    /// Round-wide status counts for the staff landing page.
    pub fn overview(&self) -> Result<ProgressSummaryView, ReviewServiceError> {
        let ballots = self.ballots.all()?;
        Ok(progress(&ballots))
    }

    /// Per-reviewer progress counts, ordered by name.
    pub fn reviewer_overview(&self) -> Result<Vec<ReviewerProgressEntry>, ReviewServiceError> {
        let reviewers = self.catalog.reviewers()?;
        let ballots = self.ballots.all()?;
        Ok(reviewer_progress(&reviewers, &ballots))
    }

    /// The assignment matrix, optionally narrowed to one category.
    pub fn assignments(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<EntryAssignmentsView>, ReviewServiceError> {
        let entries = self.catalog.entries()?;
        let reviewers = self.catalog.reviewers()?;
        let ballots = self.ballots.all()?;
        Ok(assignment_matrix(&entries, &reviewers, &ballots, category))
    }

    /// Toggles a reviewer on an entry: creates an empty ballot when none
    /// exists, withdraws a live one, and refuses to touch completed work.
    pub fn reassign(
        &self,
        entry: EntryId,
        reviewer: ReviewerId,
    ) -> Result<ReassignmentOutcome, ReviewServiceError> {
        self.catalog
            .entry(entry)?
            .ok_or(RepositoryError::NotFound)?;
        self.catalog
            .reviewer(reviewer)?
            .ok_or(RepositoryError::NotFound)?;

        let outcome = match self.ballots.fetch(entry, reviewer)? {
            None => {
                self.ballots
                    .insert(Ballot::empty(entry, reviewer, Utc::now()))?;
                ReassignmentOutcome::Created
            }
            Some(ballot) if ballot.is_live() => {
                self.ballots.delete(entry, reviewer)?;
                ReassignmentOutcome::Removed
            }
            Some(_) => ReassignmentOutcome::KeptDone,
        };

        info!(
            entry = entry.0,
            reviewer = reviewer.0,
            outcome = outcome.label(),
            "reassignment toggled"
        );
        Ok(outcome)
    }

    /// Runs the balancer over the current catalog. The plan is always
    /// computed in full; existing ballots are only replaced when `commit`
    /// is set and the plan succeeded.
    pub fn run_assignment(
        &self,
        reviews_per_entry: Option<u32>,
        commit: bool,
    ) -> Result<AssignmentRun, ReviewServiceError> {
        let reviews_per_entry = reviews_per_entry.unwrap_or(self.config.reviews_per_entry);
        let entries = self.catalog.entries()?;
        let reviewers = self.catalog.reviewers()?;

        let mut rng = rand::thread_rng();
        let plan = assignment::plan(&entries, &reviewers, reviews_per_entry, &mut rng)?;

        if commit {
            let now = Utc::now();
            let ballots: Vec<Ballot> = plan
                .ballots
                .iter()
                .map(|planned| Ballot::empty(planned.entry_id, planned.reviewer_id, now))
                .collect();
            self.ballots.replace_all(ballots)?;
            info!(
                ballots = plan.ballots.len(),
                cap = plan.fair_share_cap,
                "committed balanced assignment"
            );
        }

        Ok(AssignmentRun {
            committed: commit,
            plan,
        })
    }

    /// Installs an imported catalog. Every existing ballot points at the
    /// outgoing entries, so the ballot store is cleared with them.
    pub fn replace_catalog(&self, batch: EntryBatch) -> Result<usize, ReviewServiceError> {
        let count = batch.entries.len();
        self.catalog
            .replace_entries(batch.entries, batch.categories)?;
        self.ballots.replace_all(Vec::new())?;
        info!(entries = count, "catalog replaced, ballots reset");
        Ok(count)
    }

    /// Adds reviewers from an imported sheet, skipping e-mails already in
    /// the pool.
    pub fn provision_reviewers(
        &self,
        records: Vec<ReviewerRecord>,
    ) -> Result<ProvisionOutcome, ReviewServiceError> {
        let mut outcome = ProvisionOutcome {
            created: 0,
            skipped: 0,
        };
        for record in records {
            if self.catalog.reviewer_by_email(&record.email)?.is_some() {
                outcome.skipped += 1;
            } else {
                self.catalog.create_reviewer(record)?;
                outcome.created += 1;
            }
        }
        Ok(outcome)
    }

    /// Builds the per-category result sheets from completed ballots.
    pub fn export_sheets(&self) -> Result<Vec<CategorySheet>, ReviewServiceError> {
        let entries = self.catalog.entries()?;
        let reviewers = self.catalog.reviewers()?;
        let ballots = self.ballots.all()?;
        Ok(category_sheets(&entries, &reviewers, &ballots))
    }
}
