use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const GRADE: &str = "grade";

/// Applicant language certificate level. B2 is the baseline category and has
/// no one-hot column of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageLevel {
    B2,
    C1,
    C2,
}

impl LanguageLevel {
    pub const ALL: [Self; 3] = [Self::B2, Self::C1, Self::C2];

    /// "C1" and "C2" map to themselves; anything else counts as B2.
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "C1" => Self::C1,
            "C2" => Self::C2,
            _ => Self::B2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }

    /// One-hot column name, `None` for the baseline.
    pub fn column(self) -> Option<&'static str> {
        match self {
            Self::B2 => None,
            Self::C1 => Some("language_level_C1"),
            Self::C2 => Some("language_level_C2"),
        }
    }
}

/// Named feature values for one applicant, before alignment to a schema.
pub type FeatureRow = BTreeMap<String, f64>;

/// Encode an applicant as `grade` plus the non-baseline one-hot columns.
pub fn encode(grade: f64, level: LanguageLevel) -> FeatureRow {
    let mut row = FeatureRow::new();
    row.insert(GRADE.to_string(), grade);
    for candidate in LanguageLevel::ALL {
        if let Some(column) = candidate.column() {
            row.insert(column.to_string(), f64::from(u8::from(candidate == level)));
        }
    }
    row
}

/// Ordered feature names a classifier was trained on. Every inference row is
/// built by reindexing against this, never by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Result<Self> {
        if names.is_empty() {
            anyhow::bail!("feature schema is empty");
        }
        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            anyhow::bail!("feature `{dup}` appears twice in the schema");
        }
        if !names.iter().any(|n| n == GRADE) {
            anyhow::bail!("feature schema has no `{GRADE}` column");
        }
        Ok(Self { names })
    }

    /// `grade` followed by the one-hot columns, baseline dropped.
    pub fn admission() -> Self {
        let mut names = vec![GRADE.to_string()];
        names.extend(
            LanguageLevel::ALL
                .iter()
                .filter_map(|level| level.column())
                .map(str::to_string),
        );
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Values of `row` in schema order. Columns absent from the row are 0;
    /// columns the schema does not know are dropped.
    pub fn reindex(&self, row: &FeatureRow) -> Vec<f64> {
        for extra in row.keys().filter(|k| !self.names.contains(*k)) {
            tracing::debug!("Dropping feature `{extra}` unknown to the model schema");
        }
        self.names
            .iter()
            .map(|name| row.get(name).copied().unwrap_or(0.0))
            .collect()
    }
}

impl TryFrom<Vec<String>> for FeatureSchema {
    type Error = anyhow::Error;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::new(names)
    }
}

impl From<FeatureSchema> for Vec<String> {
    fn from(schema: FeatureSchema) -> Self {
        schema.names
    }
}
