use super::domain::{LoginKey, Session};
use crate::workflows::review::repository::RepositoryError;

/// Storage for issued login keys and open sessions.
pub trait AuthRepository: Send + Sync {
    fn store_key(&self, key: LoginKey) -> Result<(), RepositoryError>;
    fn fetch_key(&self, key: &str) -> Result<Option<LoginKey>, RepositoryError>;
    fn store_session(&self, session: Session) -> Result<(), RepositoryError>;
    fn fetch_session(&self, token: &str) -> Result<Option<Session>, RepositoryError>;
}

/// Outbound delivery hook for login keys (the mail adapter boundary).
pub trait KeyDelivery: Send + Sync {
    fn deliver(&self, key: &LoginKey) -> Result<(), DeliveryError>;
}

/// Key delivery error.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery transport unavailable: {0}")]
    Transport(String),
}
