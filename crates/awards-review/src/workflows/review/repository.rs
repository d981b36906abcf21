use super::domain::Ballot;
use crate::workflows::catalog::{
    Category, Entry, EntryId, Reviewer, ReviewerId, ReviewerRecord,
};

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage for the imported entry catalog and the reviewer pool.
///
/// Ordering contract: `entries` comes back sorted by (category name,
/// entry id) and `reviewers` by (first name, last name, id), so callers can
/// render either list without re-sorting.
pub trait CatalogRepository: Send + Sync {
    /// Replaces the whole catalog with one import batch. Ballots are owned
    /// by the ballot store; the service layer drops them alongside.
    fn replace_entries(&self, entries: Vec<Entry>, categories: Vec<Category>)
        -> Result<(), RepositoryError>;
    fn entries(&self) -> Result<Vec<Entry>, RepositoryError>;
    fn entry(&self, id: EntryId) -> Result<Option<Entry>, RepositoryError>;
    fn categories(&self) -> Result<Vec<Category>, RepositoryError>;
    fn reviewers(&self) -> Result<Vec<Reviewer>, RepositoryError>;
    fn reviewer(&self, id: ReviewerId) -> Result<Option<Reviewer>, RepositoryError>;
    /// Case-insensitive e-mail lookup, matching how login requests arrive.
    fn reviewer_by_email(&self, email: &str) -> Result<Option<Reviewer>, RepositoryError>;
    /// Adds an active, non-staff reviewer and allocates their id.
    fn create_reviewer(&self, record: ReviewerRecord) -> Result<Reviewer, RepositoryError>;
}

/// Storage for rating ballots, keyed by the unique (entry, reviewer) pair.
pub trait BallotRepository: Send + Sync {
    /// Inserts a new ballot; `Conflict` if the pair already has one.
    fn insert(&self, ballot: Ballot) -> Result<(), RepositoryError>;
    /// Updates an existing ballot; `NotFound` if the pair has none.
    fn update(&self, ballot: Ballot) -> Result<(), RepositoryError>;
    fn fetch(&self, entry: EntryId, reviewer: ReviewerId)
        -> Result<Option<Ballot>, RepositoryError>;
    fn delete(&self, entry: EntryId, reviewer: ReviewerId) -> Result<(), RepositoryError>;
    /// Drops every ballot and installs the given set in one step. The
    /// balancer commit path goes through here.
    fn replace_all(&self, ballots: Vec<Ballot>) -> Result<(), RepositoryError>;
    fn all(&self) -> Result<Vec<Ballot>, RepositoryError>;
    fn for_reviewer(&self, reviewer: ReviewerId) -> Result<Vec<Ballot>, RepositoryError>;
}
