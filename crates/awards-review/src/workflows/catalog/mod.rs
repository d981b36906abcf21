//! Nominated entries and the reviewer pool, as imported from the
//! external nomination forms provider.

pub mod detail;
pub mod domain;
pub mod import;

pub use detail::{entry_detail, DetailField, EntryDetail, FieldGroup, FieldValue};
pub use domain::{
    Category, Entry, EntryId, Reviewer, ReviewerId, RubricCriterion, RubricKind,
    INDIVIDUAL_AWARDS_CATEGORY,
};
pub use import::{
    CatalogImportError, EntryBatch, EntryImporter, RawEntryRecord, ReviewerImporter,
    ReviewerRecord,
};
