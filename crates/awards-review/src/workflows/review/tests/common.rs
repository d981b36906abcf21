use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde_json::Value;

use crate::config::{AuthConfig, ReviewConfig};
use crate::workflows::auth::domain::{LoginKey, Session};
use crate::workflows::auth::repository::{AuthRepository, DeliveryError, KeyDelivery};
use crate::workflows::auth::router::auth_router;
use crate::workflows::auth::service::AuthService;
use crate::workflows::catalog::{
    Category, Entry, EntryId, Reviewer, ReviewerId, ReviewerRecord, RubricCriterion,
};
use crate::workflows::review::domain::{Ballot, BallotStatus, ScoreCard};
use crate::workflows::review::form::BallotForm;
use crate::workflows::review::repository::{
    BallotRepository, CatalogRepository, RepositoryError,
};
use crate::workflows::review::router::{review_router, ReviewApi};
use crate::workflows::review::service::ReviewService;

#[derive(Default)]
pub(super) struct MemoryCatalog {
    entries: Mutex<BTreeMap<EntryId, Entry>>,
    categories: Mutex<Vec<Category>>,
    reviewers: Mutex<BTreeMap<ReviewerId, Reviewer>>,
}

impl MemoryCatalog {
    pub(super) fn seeded(entries: Vec<Entry>, reviewers: Vec<Reviewer>) -> Self {
        let catalog = Self::default();
        {
            let mut categories = catalog.categories.lock().expect("catalog mutex poisoned");
            for entry in &entries {
                if !categories.iter().any(|c| c.name == entry.category.name) {
                    categories.push(entry.category.clone());
                }
            }
        }
        catalog
            .entries
            .lock()
            .expect("catalog mutex poisoned")
            .extend(entries.into_iter().map(|entry| (entry.id, entry)));
        catalog
            .reviewers
            .lock()
            .expect("catalog mutex poisoned")
            .extend(reviewers.into_iter().map(|reviewer| (reviewer.id, reviewer)));
        catalog
    }
}

impl CatalogRepository for MemoryCatalog {
    fn replace_entries(
        &self,
        entries: Vec<Entry>,
        categories: Vec<Category>,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.entries.lock().expect("catalog mutex poisoned");
        guard.clear();
        guard.extend(entries.into_iter().map(|entry| (entry.id, entry)));
        *self.categories.lock().expect("catalog mutex poisoned") = categories;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<Entry>, RepositoryError> {
        let mut entries: Vec<Entry> = self
            .entries
            .lock()
            .expect("catalog mutex poisoned")
            .values()
            .cloned()
            .collect();
        entries.sort_by(|a, b| (&a.category.name, a.id).cmp(&(&b.category.name, b.id)));
        Ok(entries)
    }

    fn entry(&self, id: EntryId) -> Result<Option<Entry>, RepositoryError> {
        Ok(self
            .entries
            .lock()
            .expect("catalog mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        Ok(self.categories.lock().expect("catalog mutex poisoned").clone())
    }

    fn reviewers(&self) -> Result<Vec<Reviewer>, RepositoryError> {
        let mut reviewers: Vec<Reviewer> = self
            .reviewers
            .lock()
            .expect("catalog mutex poisoned")
            .values()
            .cloned()
            .collect();
        reviewers.sort_by(|a, b| {
            (&a.first_name, &a.last_name, a.id).cmp(&(&b.first_name, &b.last_name, b.id))
        });
        Ok(reviewers)
    }

    fn reviewer(&self, id: ReviewerId) -> Result<Option<Reviewer>, RepositoryError> {
        Ok(self
            .reviewers
            .lock()
            .expect("catalog mutex poisoned")
            .get(&id)
            .cloned())
    }

    fn reviewer_by_email(&self, email: &str) -> Result<Option<Reviewer>, RepositoryError> {
        Ok(self
            .reviewers
            .lock()
            .expect("catalog mutex poisoned")
            .values()
            .find(|reviewer| reviewer.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn create_reviewer(&self, record: ReviewerRecord) -> Result<Reviewer, RepositoryError> {
        let mut guard = self.reviewers.lock().expect("catalog mutex poisoned");
        let id = ReviewerId(guard.keys().map(|id| id.0).max().unwrap_or(0) + 1);
        let reviewer = Reviewer {
            id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            active: true,
            staff: false,
        };
        guard.insert(id, reviewer.clone());
        Ok(reviewer)
    }
}

#[derive(Default)]
pub(super) struct MemoryBallots {
    ballots: Mutex<BTreeMap<(EntryId, ReviewerId), Ballot>>,
}

impl MemoryBallots {
    pub(super) fn count(&self) -> usize {
        self.ballots.lock().expect("ballot mutex poisoned").len()
    }
}

impl BallotRepository for MemoryBallots {
    fn insert(&self, ballot: Ballot) -> Result<(), RepositoryError> {
        let mut guard = self.ballots.lock().expect("ballot mutex poisoned");
        let key = (ballot.entry_id, ballot.reviewer_id);
        if guard.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(key, ballot);
        Ok(())
    }

    fn update(&self, ballot: Ballot) -> Result<(), RepositoryError> {
        let mut guard = self.ballots.lock().expect("ballot mutex poisoned");
        let key = (ballot.entry_id, ballot.reviewer_id);
        if !guard.contains_key(&key) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(key, ballot);
        Ok(())
    }

    fn fetch(
        &self,
        entry: EntryId,
        reviewer: ReviewerId,
    ) -> Result<Option<Ballot>, RepositoryError> {
        Ok(self
            .ballots
            .lock()
            .expect("ballot mutex poisoned")
            .get(&(entry, reviewer))
            .cloned())
    }

    fn delete(&self, entry: EntryId, reviewer: ReviewerId) -> Result<(), RepositoryError> {
        let mut guard = self.ballots.lock().expect("ballot mutex poisoned");
        guard
            .remove(&(entry, reviewer))
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn replace_all(&self, ballots: Vec<Ballot>) -> Result<(), RepositoryError> {
        let mut guard = self.ballots.lock().expect("ballot mutex poisoned");
        guard.clear();
        guard.extend(
            ballots
                .into_iter()
                .map(|ballot| ((ballot.entry_id, ballot.reviewer_id), ballot)),
        );
        Ok(())
    }

    fn all(&self) -> Result<Vec<Ballot>, RepositoryError> {
        Ok(self
            .ballots
            .lock()
            .expect("ballot mutex poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn for_reviewer(&self, reviewer: ReviewerId) -> Result<Vec<Ballot>, RepositoryError> {
        Ok(self
            .ballots
            .lock()
            .expect("ballot mutex poisoned")
            .values()
            .filter(|ballot| ballot.reviewer_id == reviewer)
            .cloned()
            .collect())
    }
}

pub(super) struct UnavailableBallots;

impl BallotRepository for UnavailableBallots {
    fn insert(&self, _ballot: Ballot) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _ballot: Ballot) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(
        &self,
        _entry: EntryId,
        _reviewer: ReviewerId,
    ) -> Result<Option<Ballot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete(&self, _entry: EntryId, _reviewer: ReviewerId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn replace_all(&self, _ballots: Vec<Ballot>) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Ballot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn for_reviewer(&self, _reviewer: ReviewerId) -> Result<Vec<Ballot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemoryAuth {
    keys: Mutex<HashMap<String, LoginKey>>,
    sessions: Mutex<HashMap<String, Session>>,
}

impl AuthRepository for MemoryAuth {
    fn store_key(&self, key: LoginKey) -> Result<(), RepositoryError> {
        self.keys
            .lock()
            .expect("auth mutex poisoned")
            .insert(key.key.clone(), key);
        Ok(())
    }

    fn fetch_key(&self, key: &str) -> Result<Option<LoginKey>, RepositoryError> {
        Ok(self
            .keys
            .lock()
            .expect("auth mutex poisoned")
            .get(key)
            .cloned())
    }

    fn store_session(&self, session: Session) -> Result<(), RepositoryError> {
        self.sessions
            .lock()
            .expect("auth mutex poisoned")
            .insert(session.token.clone(), session);
        Ok(())
    }

    fn fetch_session(&self, token: &str) -> Result<Option<Session>, RepositoryError> {
        Ok(self
            .sessions
            .lock()
            .expect("auth mutex poisoned")
            .get(token)
            .cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct RecordingDelivery {
    sent: Arc<Mutex<Vec<LoginKey>>>,
}

impl RecordingDelivery {
    pub(super) fn sent(&self) -> Vec<LoginKey> {
        self.sent.lock().expect("delivery mutex poisoned").clone()
    }
}

impl KeyDelivery for RecordingDelivery {
    fn deliver(&self, key: &LoginKey) -> Result<(), DeliveryError> {
        self.sent
            .lock()
            .expect("delivery mutex poisoned")
            .push(key.clone());
        Ok(())
    }
}

pub(super) fn entry(id: i64, category: &str, subcategory: &str, title: &str) -> Entry {
    Entry {
        id: EntryId(id),
        title: title.to_string(),
        category: Category::new(category),
        subcategory: subcategory.to_string(),
        data: BTreeMap::new(),
    }
}

pub(super) fn reviewer(id: i64, first: &str, last: &str) -> Reviewer {
    Reviewer {
        id: ReviewerId(id),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@example.org", first.to_lowercase()),
        active: true,
        staff: false,
    }
}

pub(super) fn staff_reviewer(id: i64, first: &str, last: &str) -> Reviewer {
    let mut reviewer = reviewer(id, first, last);
    reviewer.staff = true;
    reviewer
}

pub(super) fn sample_entries() -> Vec<Entry> {
    vec![
        entry(11, "Open Resource Awards", "Textbook", "Atlas of Botany"),
        entry(12, "Open Resource Awards", "Video", "Field Lectures"),
        entry(21, "Individual Awards", "Educator", "Maya Okonkwo"),
    ]
}

pub(super) fn sample_reviewers() -> Vec<Reviewer> {
    vec![
        reviewer(1, "Ada", "Lovelace"),
        reviewer(2, "Grace", "Hopper"),
        reviewer(3, "Mei", "Tanaka"),
        staff_reviewer(9, "Sol", "Marchetti"),
    ]
}

pub(super) fn empty_ballot(entry: i64, reviewer: i64) -> Ballot {
    Ballot::empty(EntryId(entry), ReviewerId(reviewer), Utc::now())
}

pub(super) fn done_ballot(entry: i64, reviewer: i64, score: i32) -> Ballot {
    let mut ballot = empty_ballot(entry, reviewer);
    for criterion in RubricCriterion::STANDARD {
        ballot.scores.set(criterion, Some(score));
    }
    ballot.status = BallotStatus::Done;
    ballot
}

pub(super) fn standard_scores(score: i32) -> ScoreCard {
    let mut scores = ScoreCard::default();
    for criterion in RubricCriterion::STANDARD {
        scores.set(criterion, Some(score));
    }
    scores
}

pub(super) fn final_form(score: i32) -> BallotForm {
    BallotForm {
        scores: standard_scores(score),
        comment: Some("well researched".to_string()),
        is_draft: false,
        is_conflict: false,
    }
}

pub(super) fn draft_form(scores: ScoreCard) -> BallotForm {
    BallotForm {
        scores,
        comment: None,
        is_draft: true,
        is_conflict: false,
    }
}

pub(super) fn conflict_form() -> BallotForm {
    BallotForm {
        scores: ScoreCard::default(),
        comment: Some("I collaborated with the nominee".to_string()),
        is_draft: false,
        is_conflict: true,
    }
}

pub(super) fn build_service() -> (
    ReviewService<MemoryCatalog, MemoryBallots>,
    Arc<MemoryCatalog>,
    Arc<MemoryBallots>,
) {
    let catalog = Arc::new(MemoryCatalog::seeded(sample_entries(), sample_reviewers()));
    let ballots = Arc::new(MemoryBallots::default());
    let service = ReviewService::new(catalog.clone(), ballots.clone(), ReviewConfig::default());
    (service, catalog, ballots)
}

pub(super) struct TestApi {
    pub(super) router: axum::Router,
    pub(super) api: ReviewApi<MemoryCatalog, MemoryBallots, MemoryAuth>,
    pub(super) ballots: Arc<MemoryBallots>,
    pub(super) delivery: RecordingDelivery,
}

pub(super) fn build_api() -> TestApi {
    let catalog = Arc::new(MemoryCatalog::seeded(sample_entries(), sample_reviewers()));
    let ballots = Arc::new(MemoryBallots::default());
    let auth_store = Arc::new(MemoryAuth::default());
    let delivery = RecordingDelivery::default();

    let review = Arc::new(ReviewService::new(
        catalog.clone(),
        ballots.clone(),
        ReviewConfig::default(),
    ));
    let auth = Arc::new(AuthService::new(
        auth_store,
        catalog,
        Arc::new(delivery.clone()),
        &AuthConfig::default(),
    ));

    let api = ReviewApi {
        review,
        auth: auth.clone(),
    };
    TestApi {
        router: auth_router(auth).merge(review_router(api.clone())),
        api,
        ballots,
        delivery,
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
