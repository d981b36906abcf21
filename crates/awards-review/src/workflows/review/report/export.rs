use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::super::domain::Ballot;
use crate::workflows::catalog::{Entry, Reviewer, ReviewerId, RubricCriterion, RubricKind};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write export file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode csv: {0}")]
    Csv(#[from] csv::Error),
}

/// One result sheet: every completed ballot for one category, one row per
/// ballot, ordered by (subcategory, entry id).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySheet {
    pub category: String,
    pub rubric: RubricKind,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CategorySheet {
    /// File name the sheet lands under when exported to a directory.
    pub fn file_name(&self) -> String {
        let mut slug = String::with_capacity(self.category.len());
        let mut last_dash = true;
        for ch in self.category.chars() {
            if ch.is_ascii_alphanumeric() {
                slug.push(ch.to_ascii_lowercase());
                last_dash = false;
            } else if !last_dash {
                slug.push('-');
                last_dash = true;
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        format!("{slug}.csv")
    }
}

/// Builds one sheet per category present in the catalog. Only `Done`
/// ballots contribute rows; categories with no completed ballots still get
/// a sheet with just the header.
pub fn category_sheets(
    entries: &[Entry],
    reviewers: &[Reviewer],
    ballots: &[Ballot],
) -> Vec<CategorySheet> {
    let names: HashMap<ReviewerId, String> = reviewers
        .iter()
        .map(|reviewer| (reviewer.id, reviewer.display_name()))
        .collect();

    let mut categories: Vec<(&str, RubricKind)> = Vec::new();
    for entry in entries {
        if !categories.iter().any(|(name, _)| *name == entry.category.name) {
            categories.push((entry.category.name.as_str(), entry.category.rubric));
        }
    }
    categories.sort_by_key(|(name, _)| name.to_string());

    categories
        .into_iter()
        .map(|(category, rubric)| build_sheet(category, rubric, entries, ballots, &names))
        .collect()
}

fn build_sheet(
    category: &str,
    rubric: RubricKind,
    entries: &[Entry],
    ballots: &[Ballot],
    names: &HashMap<ReviewerId, String>,
) -> CategorySheet {
    let columns = match rubric {
        RubricKind::Individual => vec![
            "Subcategory".to_string(),
            "ID".to_string(),
            "Name".to_string(),
            "Reviewer".to_string(),
            "Total".to_string(),
            "Comment".to_string(),
        ],
        RubricKind::Standard => {
            let mut columns = vec![
                "Subcategory".to_string(),
                "ID".to_string(),
                "Title".to_string(),
                "Reviewer".to_string(),
            ];
            columns.extend(
                RubricCriterion::STANDARD
                    .iter()
                    .map(|criterion| criterion.label().to_string()),
            );
            columns.push("Average".to_string());
            columns.push("Comment".to_string());
            columns
        }
    };

    let mut scored: Vec<(&Entry, &Ballot, String)> = Vec::new();
    for entry in entries.iter().filter(|e| e.category.name == category) {
        for ballot in ballots
            .iter()
            .filter(|b| b.entry_id == entry.id && b.status.is_done())
        {
            let reviewer = names
                .get(&ballot.reviewer_id)
                .cloned()
                .unwrap_or_else(|| format!("reviewer #{}", ballot.reviewer_id.0));
            scored.push((entry, ballot, reviewer));
        }
    }
    scored.sort_by(|a, b| {
        (&a.0.subcategory, a.0.id, &a.2).cmp(&(&b.0.subcategory, b.0.id, &b.2))
    });

    let rows = scored
        .into_iter()
        .map(|(entry, ballot, reviewer)| {
            let mut row = vec![
                entry.subcategory.clone(),
                entry.id.0.to_string(),
                entry.title.clone(),
                reviewer,
            ];
            match rubric {
                RubricKind::Individual => {
                    row.push(score_cell(ballot.scores.individual));
                }
                RubricKind::Standard => {
                    for criterion in RubricCriterion::STANDARD {
                        row.push(score_cell(ballot.scores.get(criterion)));
                    }
                    row.push(
                        ballot
                            .average()
                            .map(|avg| format!("{avg:.2}"))
                            .unwrap_or_default(),
                    );
                }
            }
            row.push(ballot.comment.clone());
            row
        })
        .collect();

    CategorySheet {
        category: category.to_string(),
        rubric,
        columns,
        rows,
    }
}

fn score_cell(score: Option<i32>) -> String {
    score.map(|value| value.to_string()).unwrap_or_default()
}

/// Serialises one sheet as CSV.
pub fn write_sheet<W: Write>(sheet: &CategorySheet, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&sheet.columns)?;
    for row in &sheet.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes every sheet into `dir` and returns the created paths.
pub fn export_directory(
    sheets: &[CategorySheet],
    dir: impl AsRef<Path>,
) -> Result<Vec<PathBuf>, ExportError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut paths = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let path = dir.join(sheet.file_name());
        let file = File::create(&path)?;
        write_sheet(sheet, file)?;
        paths.push(path);
    }
    Ok(paths)
}
