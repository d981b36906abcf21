//! Review engine for award nominations.
//!
//! The crate is organised around three workflows: the entry `catalog`
//! imported from the nomination forms provider, the `review` workflow
//! that balances ballots across the reviewer pool and walks each ballot
//! through its rating lifecycle, and the `auth` workflow that turns an
//! e-mailed login key into a reviewer session.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;

pub use error::AppError;
