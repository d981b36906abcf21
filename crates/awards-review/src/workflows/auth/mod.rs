//! Passwordless reviewer login: a key is e-mailed on request and redeeming
//! it within its validity window opens a bearer session.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{LoginKey, ReviewerContext, Session};
pub use repository::{AuthRepository, DeliveryError, KeyDelivery};
pub use router::auth_router;
pub use service::{AuthError, AuthService};
