use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use super::domain::{LoginKey, ReviewerContext, Session};
use super::repository::{AuthRepository, DeliveryError, KeyDelivery};
use crate::config::AuthConfig;
use crate::workflows::review::repository::{CatalogRepository, RepositoryError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("E-mail you entered is not in our system. Please contact support.")]
    UnknownEmail,
    #[error("login key is not recognised")]
    UnknownKey,
    #[error("login key has expired")]
    ExpiredKey,
    #[error("authentication required")]
    MissingSession,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Issues login keys against the reviewer pool and turns redeemed keys into
/// bearer sessions.
pub struct AuthService<A, C> {
    store: Arc<A>,
    catalog: Arc<C>,
    delivery: Arc<dyn KeyDelivery>,
    validity: Duration,
}

impl<A, C> AuthService<A, C>
where
    A: AuthRepository + 'static,
    C: CatalogRepository + 'static,
{
    pub fn new(
        store: Arc<A>,
        catalog: Arc<C>,
        delivery: Arc<dyn KeyDelivery>,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            catalog,
            delivery,
            validity: Duration::days(config.login_key_validity_days),
        }
    }

    /// Issues a key for the reviewer behind `email` and hands it to the
    /// delivery boundary. The e-mail lookup is case-insensitive.
    pub fn request_login(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<LoginKey, AuthError> {
        let reviewer = self
            .catalog
            .reviewer_by_email(email.trim())?
            .ok_or(AuthError::UnknownEmail)?;

        let key = LoginKey::issue(&reviewer, now);
        self.store.store_key(key.clone())?;
        self.delivery.deliver(&key)?;
        info!(reviewer = reviewer.id.0, "login key issued");
        Ok(key)
    }

    /// Redeems a mailed key. Keys older than the validity window fail
    /// closed; nothing distinguishes an expired key from an unknown one to
    /// the caller beyond the error message.
    pub fn redeem_key(&self, key: &str, now: DateTime<Utc>) -> Result<Session, AuthError> {
        let stored = self.store.fetch_key(key)?.ok_or(AuthError::UnknownKey)?;

        if now.signed_duration_since(stored.issued_at) > self.validity {
            return Err(AuthError::ExpiredKey);
        }

        let session = Session::open(stored.reviewer_id, now, self.validity);
        self.store.store_session(session.clone())?;
        info!(reviewer = stored.reviewer_id.0, "session opened");
        Ok(session)
    }

    /// Resolves a bearer token into the calling reviewer. Expired sessions
    /// and sessions whose reviewer has left the pool both read as missing.
    pub fn context(&self, token: &str, now: DateTime<Utc>) -> Result<ReviewerContext, AuthError> {
        let session = self
            .store
            .fetch_session(token)?
            .ok_or(AuthError::MissingSession)?;
        if session.expired(now) {
            return Err(AuthError::MissingSession);
        }

        let reviewer = self
            .catalog
            .reviewer(session.reviewer_id)?
            .filter(|reviewer| reviewer.active)
            .ok_or(AuthError::MissingSession)?;

        Ok(ReviewerContext {
            reviewer_id: reviewer.id,
            display_name: reviewer.display_name(),
            staff: reviewer.staff,
        })
    }
}
