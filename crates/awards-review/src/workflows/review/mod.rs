//! The review round: balanced ballot assignment, the per-ballot rating
//! workflow, and the aggregation views staff and exports read.

pub mod assignment;
pub mod domain;
pub mod form;
pub mod report;
pub mod repository;
pub mod router;
pub mod service;
pub(crate) mod workflow;

#[cfg(test)]
mod tests;

pub use assignment::{AssignmentError, AssignmentPlan, PlannedBallot, ReviewerLoad};
pub use domain::{Ballot, BallotStatus, ScoreCard, StatusFilter};
pub use form::{BallotForm, ValidationError};
pub use repository::{BallotRepository, CatalogRepository, RepositoryError};
pub use router::{review_router, ReviewApi};
pub use service::{
    AssignmentRun, ProvisionOutcome, ReassignmentOutcome, ReviewService, ReviewServiceError,
};
