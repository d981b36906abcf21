use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::domain::{Entry, EntryId, RubricKind};

/// Categories whose nominator identity stays hidden from regular reviewers.
const NOMINATOR_RESTRICTED: [&str; 2] = ["Open Assets Awards", "Open Practices Awards"];

/// Entry detail assembled for the review screen. Which fields appear depends
/// on whether the caller is staff; contact details never reach regular
/// reviewers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryDetail {
    pub entry_id: EntryId,
    pub title: String,
    pub category: String,
    pub rubric: RubricKind,
    pub subcategory: String,
    pub groups: Vec<FieldGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldGroup {
    pub name: &'static str,
    pub fields: Vec<DetailField>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: FieldValue,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Links(Vec<String>),
}

pub fn entry_detail(entry: &Entry, staff: bool) -> EntryDetail {
    let data = &entry.data;
    let mut groups = Vec::with_capacity(3);

    let mut nominee = Vec::new();
    push_text(&mut nominee, "Title", text(data, "Title"));
    push_text(&mut nominee, "Link", text(data, "Link"));
    push_text(&mut nominee, "License", text(data, "License"));
    push_text(
        &mut nominee,
        "Description",
        text(data, "Description").or_else(|| text(data, "Description (optional)")),
    );
    push_text(&mut nominee, "Institution", text(data, "C_Institution"));
    push_text(
        &mut nominee,
        "Location",
        join_parts(text(data, "City"), text(data, "Country"), ", "),
    );
    if staff {
        push_text(
            &mut nominee,
            "Name",
            join_parts(text(data, "C_First"), text(data, "C_Last"), " "),
        );
        push_text(&mut nominee, "Email", text(data, "C_Email"));
        push_text(&mut nominee, "Twitter", text(data, "C_Twitter"));
    }
    groups.push(FieldGroup {
        name: "Nominee's Information",
        fields: nominee,
    });

    let letters = links(data, "Letter of Support (required if self-nominating)");
    let materials = links(data, "Additional Support Material (optional)");
    let mut supporting = Vec::new();
    push_text(&mut supporting, "Proposed Citation", text(data, "Proposed Citation"));
    push_text(&mut supporting, "Background", text(data, "Background"));
    push_text(
        &mut supporting,
        "Youtube video",
        text(data, "Link to Youtube video (optional, but encouraged)"),
    );
    if !letters.is_empty() {
        supporting.push(DetailField {
            label: "Letter of Support",
            value: FieldValue::Links(letters),
        });
    }
    if !materials.is_empty() {
        supporting.push(DetailField {
            label: "Additional Support Material",
            value: FieldValue::Links(materials),
        });
    }
    push_text(
        &mut supporting,
        "Slideshare presentation",
        text(data, "Link to Slideshare presentation (optional)"),
    );
    if !supporting.is_empty() {
        groups.push(FieldGroup {
            name: "Supporting materials",
            fields: supporting,
        });
    }

    let restricted = NOMINATOR_RESTRICTED.contains(&entry.category.name.as_str());
    if staff || !restricted {
        let mut nominator = Vec::new();
        push_text(
            &mut nominator,
            "Name",
            join_parts(text(data, "N_First"), text(data, "N_Last"), " "),
        );
        push_text(&mut nominator, "Institution", text(data, "N_Institution"));
        if staff {
            push_text(&mut nominator, "Email", text(data, "N_Email"));
            push_text(&mut nominator, "Twitter", text(data, "N_Twitter"));
        }
        if !nominator.is_empty() {
            groups.push(FieldGroup {
                name: "Nominator's Information",
                fields: nominator,
            });
        }
    }

    EntryDetail {
        entry_id: entry.id,
        title: entry.title.clone(),
        category: entry.category.name.clone(),
        rubric: entry.category.rubric,
        subcategory: entry.subcategory.clone(),
        groups,
    }
}

fn text(data: &BTreeMap<String, Value>, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn links(data: &BTreeMap<String, Value>, key: &str) -> Vec<String> {
    match data.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) if !single.trim().is_empty() => {
            vec![single.trim().to_string()]
        }
        _ => Vec::new(),
    }
}

fn join_parts(first: Option<String>, second: Option<String>, sep: &str) -> Option<String> {
    match (first, second) {
        (Some(a), Some(b)) => Some(format!("{a}{sep}{b}")),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn push_text(fields: &mut Vec<DetailField>, label: &'static str, value: Option<String>) {
    if let Some(value) = value {
        fields.push(DetailField {
            label,
            value: FieldValue::Text(value),
        });
    }
}
