use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric identifier assigned to an entry by the nomination forms provider.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct EntryId(pub i64);

/// Identifier for a reviewer in the pool.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ReviewerId(pub i64);

/// Category whose entries are judged with the single-score rubric.
pub const INDIVIDUAL_AWARDS_CATEGORY: &str = "Individual Awards";

/// Which rubric form a category presents to its reviewers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricKind {
    Standard,
    Individual,
}

const STANDARD_CRITERIA: [RubricCriterion; 8] = [
    RubricCriterion::Access,
    RubricCriterion::Quality,
    RubricCriterion::Visual,
    RubricCriterion::Engagement,
    RubricCriterion::Inclusion,
    RubricCriterion::Licensing,
    RubricCriterion::Accessibility,
    RubricCriterion::Currency,
];

const INDIVIDUAL_CRITERIA: [RubricCriterion; 1] = [RubricCriterion::Individual];

impl RubricKind {
    pub fn for_category_name(name: &str) -> Self {
        if name == INDIVIDUAL_AWARDS_CATEGORY {
            Self::Individual
        } else {
            Self::Standard
        }
    }

    /// Criteria a ballot in this rubric must score before it can complete.
    pub fn criteria(self) -> &'static [RubricCriterion] {
        match self {
            Self::Standard => &STANDARD_CRITERIA,
            Self::Individual => &INDIVIDUAL_CRITERIA,
        }
    }
}

/// One scoring criterion on the rating rubric. The first eight make up the
/// standard rubric shared by most categories; `Individual` stands alone for
/// the Individual Awards category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricCriterion {
    Access,
    Quality,
    Visual,
    Engagement,
    Inclusion,
    Licensing,
    Accessibility,
    Currency,
    Individual,
}

impl RubricCriterion {
    /// The eight criteria averaged into an entry's aggregate score.
    pub const STANDARD: [Self; 8] = STANDARD_CRITERIA;

    pub const fn label(self) -> &'static str {
        match self {
            Self::Access => "Access",
            Self::Quality => "Quality",
            Self::Visual => "Visual representation",
            Self::Engagement => "Engagement",
            Self::Inclusion => "Inclusion",
            Self::Licensing => "Licensing",
            Self::Accessibility => "Accessibility",
            Self::Currency => "Currency",
            Self::Individual => "Individual Rating",
        }
    }

    /// Guidance shown next to the criterion on the rating form.
    pub const fn description(self) -> &'static str {
        match self {
            Self::Access => "Resources are easily accessible and readily available to anyone.",
            Self::Quality => {
                "Exemplary quality in the presentation of content (in breadth, depth, creativity)"
            }
            Self::Visual => {
                "Uses multiple means of visual representation through accessible embedded multimedia content."
            }
            Self::Engagement => {
                "Provides multiple means of engagement through social learning connections, networks and/or communities."
            }
            Self::Inclusion => {
                "Promotes inclusiveness and diversity through the use of a variety of languages and cultural contexts."
            }
            Self::Licensing => {
                "Copyright and Fair Use guidelines are followed with proper use of citations. An open license is clearly stated."
            }
            Self::Accessibility => "The resource supports learners with diverse needs.",
            Self::Currency => {
                "Information is current and up to date. Date of materials is clearly indicated."
            }
            Self::Individual => "Overall rating of the nominated individual's contribution.",
        }
    }
}

/// An award category. The rubric kind is derived from the category name at
/// import time and stays fixed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub rubric: RubricKind,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let rubric = RubricKind::for_category_name(&name);
        Self { name, rubric }
    }
}

/// A nominated entry. `data` carries the raw form answers keyed by the
/// provider's question labels; everything beyond title and category is
/// read from there on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub title: String,
    pub category: Category,
    pub subcategory: String,
    pub data: BTreeMap<String, Value>,
}

/// A member of the reviewer pool. Staff accounts coordinate the round and
/// never receive ballots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reviewer {
    pub id: ReviewerId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub active: bool,
    pub staff: bool,
}

impl Reviewer {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Whether the balancer may hand this reviewer ballots.
    pub fn assignable(&self) -> bool {
        self.active && !self.staff
    }
}
