//! Task category: the closed set of life areas a task belongs to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RuleViolation, TrackerError};

/// Life area a tracked task belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Work,
    Study,
    Personal,
    Health,
    Hobbies,
    Other,
}

impl TaskCategory {
    /// Every category, in canonical order.
    #[must_use]
    pub fn all() -> [Self; 6] {
        [
            Self::Work,
            Self::Study,
            Self::Personal,
            Self::Health,
            Self::Hobbies,
            Self::Other,
        ]
    }

    /// Parse a raw token, ignoring surrounding whitespace and case.
    ///
    /// # Errors
    ///
    /// Returns [`RuleViolation::InvalidCategory`] when the normalized token is
    /// not one of the canonical categories. There is no partial matching.
    pub fn parse(raw: &str) -> Result<Self, TrackerError> {
        let normalized = raw.trim().to_lowercase();
        Self::all()
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or_else(|| RuleViolation::InvalidCategory(normalized).into())
    }

    /// Canonical lowercase token.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Study => "study",
            Self::Personal => "personal",
            Self::Health => "health",
            Self::Hobbies => "hobbies",
            Self::Other => "other",
        }
    }

    /// Re-check membership in the canonical set.
    #[must_use]
    pub fn is_valid(self) -> bool {
        Self::all().contains(&self)
    }
}

impl FromStr for TaskCategory {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn should_list_six_distinct_categories_in_stable_order() {
        let all = TaskCategory::all();
        assert_eq!(all.len(), 6);
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), 6);
        let tokens: Vec<_> = all.iter().map(|c| c.as_str()).collect();
        assert_eq!(
            tokens,
            ["work", "study", "personal", "health", "hobbies", "other"]
        );
    }

    #[test]
    fn should_parse_canonical_token_ignoring_case_and_whitespace() {
        for category in TaskCategory::all() {
            let raw = format!("  \t{}\n ", category.as_str().to_uppercase());
            assert_eq!(TaskCategory::parse(&raw).unwrap(), category);
        }
        assert_eq!(TaskCategory::parse("HoBbIeS").unwrap(), TaskCategory::Hobbies);
    }

    #[test]
    fn should_reject_unknown_and_partial_tokens() {
        for raw in ["", "   ", "wor", "works", "sport", "work out", "w o r k"] {
            let err = TaskCategory::parse(raw).unwrap_err();
            assert!(err.is_domain_rule(), "raw = {raw:?}");
            assert_eq!(err.code(), "INVALID_CATEGORY");
        }
    }

    #[test]
    fn should_parse_through_from_str() {
        let category: TaskCategory = "Study".parse().unwrap();
        assert_eq!(category, TaskCategory::Study);
    }

    #[test]
    fn should_report_every_category_as_valid() {
        assert!(TaskCategory::all().into_iter().all(TaskCategory::is_valid));
    }

    #[test]
    fn should_serialize_as_lowercase_token() {
        let json = serde_json::to_string(&TaskCategory::Health).unwrap();
        assert_eq!(json, "\"health\"");
        assert!(serde_json::from_str::<TaskCategory>("\"gaming\"").is_err());
    }
}
