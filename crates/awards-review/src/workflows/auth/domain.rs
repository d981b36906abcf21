use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::workflows::catalog::{Reviewer, ReviewerId};

/// A single-use-style login key mailed to a reviewer. The key itself is a
/// random 32-character hex string; redeeming it is bounded by the issue
/// time, not by a consumed flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginKey {
    pub key: String,
    pub reviewer_id: ReviewerId,
    pub email: String,
    pub issued_at: DateTime<Utc>,
}

impl LoginKey {
    pub fn issue(reviewer: &Reviewer, now: DateTime<Utc>) -> Self {
        Self {
            key: Uuid::new_v4().simple().to_string(),
            reviewer_id: reviewer.id,
            email: reviewer.email.clone(),
            issued_at: now,
        }
    }

    /// Path the mailed link points at.
    pub fn login_path(&self) -> String {
        format!("/api/v1/auth/login/{}", self.key)
    }
}

/// An open reviewer session, identified by an opaque bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub reviewer_id: ReviewerId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn open(reviewer_id: ReviewerId, now: DateTime<Utc>, validity: Duration) -> Self {
        Self {
            token: Uuid::new_v4().simple().to_string(),
            reviewer_id,
            issued_at: now,
            expires_at: now + validity,
        }
    }

    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// The authenticated caller, as handlers see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerContext {
    pub reviewer_id: ReviewerId,
    pub display_name: String,
    pub staff: bool,
}
