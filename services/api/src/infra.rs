use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use awards_review::error::AppError;
use awards_review::workflows::auth::{
    AuthRepository, DeliveryError, KeyDelivery, LoginKey, Session,
};
use awards_review::workflows::catalog::{
    Category, Entry, EntryId, Reviewer, ReviewerId, ReviewerRecord,
};
use awards_review::workflows::review::{
    Ballot, BallotRepository, CatalogRepository, RepositoryError,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct StoreInner {
    entries: BTreeMap<EntryId, Entry>,
    categories: Vec<Category>,
    reviewers: BTreeMap<ReviewerId, Reviewer>,
    ballots: BTreeMap<(EntryId, ReviewerId), Ballot>,
    login_keys: HashMap<String, LoginKey>,
    sessions: HashMap<String, Session>,
}

/// One in-memory store backing all three repository traits, so the service
/// and the round-management commands share a single state file.
#[derive(Default, Clone)]
pub(crate) struct MemoryStore {
    inner: Arc<Mutex<StoreInner>>,
}

/// On-disk snapshot of a review round. Login keys and sessions are not
/// persisted; a restart signs everyone out.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct StateSnapshot {
    #[serde(default)]
    pub(crate) entries: Vec<Entry>,
    #[serde(default)]
    pub(crate) reviewers: Vec<Reviewer>,
    #[serde(default)]
    pub(crate) ballots: Vec<Ballot>,
}

impl MemoryStore {
    pub(crate) fn from_snapshot(snapshot: StateSnapshot) -> Self {
        let mut inner = StoreInner::default();

        for entry in snapshot.entries {
            if !inner
                .categories
                .iter()
                .any(|category| category.name == entry.category.name)
            {
                inner.categories.push(entry.category.clone());
            }
            inner.entries.insert(entry.id, entry);
        }
        for reviewer in snapshot.reviewers {
            inner.reviewers.insert(reviewer.id, reviewer);
        }
        for ballot in snapshot.ballots {
            inner
                .ballots
                .insert((ballot.entry_id, ballot.reviewer_id), ballot);
        }

        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    pub(crate) fn snapshot(&self) -> StateSnapshot {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        StateSnapshot {
            entries: inner.entries.values().cloned().collect(),
            reviewers: inner.reviewers.values().cloned().collect(),
            ballots: inner.ballots.values().cloned().collect(),
        }
    }

    /// Loads a store from the state file, or starts empty when no path is
    /// given or nothing exists there yet.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !path.exists() {
            info!(path = %path.display(), "no state file yet, starting empty");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let snapshot: StateSnapshot = serde_json::from_str(&raw)?;
        let store = Self::from_snapshot(snapshot);
        {
            let inner = store.inner.lock().expect("repository mutex poisoned");
            info!(
                path = %path.display(),
                entries = inner.entries.len(),
                reviewers = inner.reviewers.len(),
                ballots = inner.ballots.len(),
                "state loaded"
            );
        }
        Ok(store)
    }

    pub(crate) fn save(&self, path: &Path) -> Result<(), AppError> {
        let raw = serde_json::to_string_pretty(&self.snapshot())?;
        fs::write(path, raw)?;
        Ok(())
    }
}

impl CatalogRepository for MemoryStore {
    fn replace_entries(
        &self,
        entries: Vec<Entry>,
        categories: Vec<Category>,
    ) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        inner.entries.clear();
        inner
            .entries
            .extend(entries.into_iter().map(|entry| (entry.id, entry)));
        inner.categories = categories;
        Ok(())
    }

    fn entries(&self) -> Result<Vec<Entry>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        let mut entries: Vec<Entry> = inner.entries.values().cloned().collect();
        entries.sort_by(|a, b| (&a.category.name, a.id).cmp(&(&b.category.name, b.id)));
        Ok(entries)
    }

    fn entry(&self, id: EntryId) -> Result<Option<Entry>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner.entries.get(&id).cloned())
    }

    fn categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner.categories.clone())
    }

    fn reviewers(&self) -> Result<Vec<Reviewer>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        let mut reviewers: Vec<Reviewer> = inner.reviewers.values().cloned().collect();
        reviewers.sort_by(|a, b| {
            (&a.first_name, &a.last_name, a.id).cmp(&(&b.first_name, &b.last_name, b.id))
        });
        Ok(reviewers)
    }

    fn reviewer(&self, id: ReviewerId) -> Result<Option<Reviewer>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner.reviewers.get(&id).cloned())
    }

    fn reviewer_by_email(&self, email: &str) -> Result<Option<Reviewer>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner
            .reviewers
            .values()
            .find(|reviewer| reviewer.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn create_reviewer(&self, record: ReviewerRecord) -> Result<Reviewer, RepositoryError> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        let id = ReviewerId(inner.reviewers.keys().map(|id| id.0).max().unwrap_or(0) + 1);
        let reviewer = Reviewer {
            id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            active: true,
            staff: false,
        };
        inner.reviewers.insert(id, reviewer.clone());
        Ok(reviewer)
    }
}

impl BallotRepository for MemoryStore {
    fn insert(&self, ballot: Ballot) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        let key = (ballot.entry_id, ballot.reviewer_id);
        if inner.ballots.contains_key(&key) {
            return Err(RepositoryError::Conflict);
        }
        inner.ballots.insert(key, ballot);
        Ok(())
    }

    fn update(&self, ballot: Ballot) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        let key = (ballot.entry_id, ballot.reviewer_id);
        if !inner.ballots.contains_key(&key) {
            return Err(RepositoryError::NotFound);
        }
        inner.ballots.insert(key, ballot);
        Ok(())
    }

    fn fetch(
        &self,
        entry: EntryId,
        reviewer: ReviewerId,
    ) -> Result<Option<Ballot>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner.ballots.get(&(entry, reviewer)).cloned())
    }

    fn delete(&self, entry: EntryId, reviewer: ReviewerId) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        inner
            .ballots
            .remove(&(entry, reviewer))
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    fn replace_all(&self, ballots: Vec<Ballot>) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        inner.ballots.clear();
        inner.ballots.extend(
            ballots
                .into_iter()
                .map(|ballot| ((ballot.entry_id, ballot.reviewer_id), ballot)),
        );
        Ok(())
    }

    fn all(&self) -> Result<Vec<Ballot>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner.ballots.values().cloned().collect())
    }

    fn for_reviewer(&self, reviewer: ReviewerId) -> Result<Vec<Ballot>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner
            .ballots
            .values()
            .filter(|ballot| ballot.reviewer_id == reviewer)
            .cloned()
            .collect())
    }
}

impl AuthRepository for MemoryStore {
    fn store_key(&self, key: LoginKey) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        inner.login_keys.insert(key.key.clone(), key);
        Ok(())
    }

    fn fetch_key(&self, key: &str) -> Result<Option<LoginKey>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner.login_keys.get(key).cloned())
    }

    fn store_session(&self, session: Session) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().expect("repository mutex poisoned");
        inner.sessions.insert(session.token.clone(), session);
        Ok(())
    }

    fn fetch_session(&self, token: &str) -> Result<Option<Session>, RepositoryError> {
        let inner = self.inner.lock().expect("repository mutex poisoned");
        Ok(inner.sessions.get(token).cloned())
    }
}

/// Mail adapter for development deployments: the login link lands in the
/// service log instead of an inbox.
#[derive(Default, Clone)]
pub(crate) struct LoggedKeyDelivery;

impl KeyDelivery for LoggedKeyDelivery {
    fn deliver(&self, key: &LoginKey) -> Result<(), DeliveryError> {
        info!(email = %key.email, path = %key.login_path(), "login key issued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_entry(id: i64, category: &str) -> Entry {
        Entry {
            id: EntryId(id),
            title: format!("Entry {id}"),
            category: Category::new(category),
            subcategory: String::new(),
            data: BTreeMap::new(),
        }
    }

    fn sample_reviewer(id: i64) -> Reviewer {
        Reviewer {
            id: ReviewerId(id),
            first_name: format!("Reviewer{id}"),
            last_name: "Pool".to_string(),
            email: format!("reviewer{id}@example.org"),
            active: true,
            staff: false,
        }
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let store = MemoryStore::from_snapshot(StateSnapshot {
            entries: vec![
                sample_entry(1, "Open Resource Awards"),
                sample_entry(2, "Individual Awards"),
            ],
            reviewers: vec![sample_reviewer(1)],
            ballots: vec![Ballot::empty(EntryId(1), ReviewerId(1), Utc::now())],
        });

        let raw = serde_json::to_string(&store.snapshot()).expect("snapshot encodes");
        let restored: StateSnapshot = serde_json::from_str(&raw).expect("snapshot decodes");
        let restored = MemoryStore::from_snapshot(restored);

        assert_eq!(restored.entries().expect("entries").len(), 2);
        assert_eq!(restored.reviewers().expect("reviewers").len(), 1);
        assert_eq!(restored.all().expect("ballots").len(), 1);
        assert_eq!(
            restored.categories().expect("categories").len(),
            2,
            "categories rebuild from the entries"
        );
    }

    #[test]
    fn save_and_load_share_a_state_file() {
        let path = std::env::temp_dir().join(format!(
            "awards-review-state-{}-save-load.json",
            std::process::id()
        ));

        let store = MemoryStore::from_snapshot(StateSnapshot {
            entries: vec![sample_entry(1, "Open Resource Awards")],
            reviewers: vec![sample_reviewer(1)],
            ballots: Vec::new(),
        });
        store.save(&path).expect("state written");

        let restored = MemoryStore::load(Some(&path)).expect("state read");
        assert_eq!(restored.entries().expect("entries").len(), 1);
        assert!(restored
            .reviewer_by_email("reviewer1@example.org")
            .expect("lookup")
            .is_some());

        std::fs::remove_file(&path).expect("cleanup");
    }

    #[test]
    fn load_without_a_file_starts_empty() {
        let path = std::env::temp_dir().join(format!(
            "awards-review-state-{}-missing.json",
            std::process::id()
        ));
        let store = MemoryStore::load(Some(&path)).expect("missing file is fine");
        assert!(store.entries().expect("entries").is_empty());

        let store = MemoryStore::load(None).expect("no path is fine");
        assert!(store.entries().expect("entries").is_empty());
    }

    #[test]
    fn ballot_writes_enforce_pair_uniqueness() {
        let store = MemoryStore::default();
        let ballot = Ballot::empty(EntryId(1), ReviewerId(1), Utc::now());

        store.insert(ballot.clone()).expect("first insert");
        assert!(matches!(
            store.insert(ballot.clone()),
            Err(RepositoryError::Conflict)
        ));

        store.delete(EntryId(1), ReviewerId(1)).expect("delete");
        assert!(matches!(
            store.update(ballot),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn created_reviewers_get_fresh_ids() {
        let store = MemoryStore::from_snapshot(StateSnapshot {
            entries: Vec::new(),
            reviewers: vec![sample_reviewer(7)],
            ballots: Vec::new(),
        });

        let created = store
            .create_reviewer(ReviewerRecord {
                first_name: "Jo".to_string(),
                last_name: "Ncube".to_string(),
                email: "jo@example.org".to_string(),
            })
            .expect("reviewer created");

        assert_eq!(created.id, ReviewerId(8));
        assert!(created.active);
        assert!(!created.staff);
    }
}
