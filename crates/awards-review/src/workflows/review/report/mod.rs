pub mod export;
mod summary;
pub mod views;

pub use summary::{assignment_matrix, progress, reviewer_progress, reviewer_queue};
