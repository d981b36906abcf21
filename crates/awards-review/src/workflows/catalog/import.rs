use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::domain::{Category, Entry, EntryId};

/// One record from the forms provider's JSON export. `data` holds the raw
/// form answers keyed by question label; nominee fields carry a `C_` prefix
/// and nominator fields an `N_` prefix.
#[derive(Debug, Clone, Deserialize)]
pub struct RawEntryRecord {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub data: BTreeMap<String, Value>,
}

impl RawEntryRecord {
    fn resolved_title(&self) -> Option<String> {
        if let Some(title) = self.title.as_deref() {
            if !title.trim().is_empty() {
                return Some(title.trim().to_string());
            }
        }
        if let Some(title) = self.data.get("Title").and_then(Value::as_str) {
            if !title.trim().is_empty() {
                return Some(title.trim().to_string());
            }
        }

        // Individual nominations have no title; fall back to the nominee name.
        let first = self.data.get("C_First").and_then(Value::as_str).unwrap_or("");
        let last = self.data.get("C_Last").and_then(Value::as_str).unwrap_or("");
        let name = format!("{first} {last}").trim().to_string();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogImportError {
    #[error("failed to read import file: {0}")]
    Io(#[from] std::io::Error),
    #[error("entry export is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("reviewer sheet is not valid CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("entry record #{id} has no title and no nominee name to fall back to")]
    MissingTitle { id: i64 },
    #[error("entry record #{id} has no category")]
    MissingCategory { id: i64 },
    #[error("reviewer row {row} has no e-mail address")]
    MissingEmail { row: usize },
}

/// Entries parsed from one export, plus the categories they introduce in
/// first-seen order.
#[derive(Debug, Clone, Default)]
pub struct EntryBatch {
    pub entries: Vec<Entry>,
    pub categories: Vec<Category>,
}

/// Parses the forms provider's JSON export into a replacement catalog.
pub struct EntryImporter;

impl EntryImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<EntryBatch, CatalogImportError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<EntryBatch, CatalogImportError> {
        let records: Vec<RawEntryRecord> = serde_json::from_reader(reader)?;
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<RawEntryRecord>) -> Result<EntryBatch, CatalogImportError> {
        let mut categories: Vec<Category> = Vec::new();
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            let category_name = record.category.trim();
            if category_name.is_empty() {
                return Err(CatalogImportError::MissingCategory { id: record.id });
            }
            let title = record
                .resolved_title()
                .ok_or(CatalogImportError::MissingTitle { id: record.id })?;

            if !categories.iter().any(|c| c.name == category_name) {
                categories.push(Category::new(category_name));
            }
            let category = Category::new(category_name);

            entries.push(Entry {
                id: EntryId(record.id),
                title,
                category,
                subcategory: record.subcategory.trim().to_string(),
                data: record.data,
            });
        }

        Ok(EntryBatch {
            entries,
            categories,
        })
    }
}

/// Identity triple from one row of the reviewer spreadsheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewerRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Parses the headerless `first,last,email` reviewer sheet.
pub struct ReviewerImporter;

impl ReviewerImporter {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Vec<ReviewerRecord>, CatalogImportError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ReviewerRecord>, CatalogImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (index, row) in csv_reader.records().enumerate() {
            let row = row?;
            let first_name = row.get(0).unwrap_or("").to_string();
            let last_name = row.get(1).unwrap_or("").to_string();
            let email = row.get(2).unwrap_or("").to_string();

            if first_name.is_empty() && last_name.is_empty() && email.is_empty() {
                continue;
            }
            if email.is_empty() {
                return Err(CatalogImportError::MissingEmail { row: index + 1 });
            }

            records.push(ReviewerRecord {
                first_name,
                last_name,
                email,
            });
        }

        Ok(records)
    }
}
