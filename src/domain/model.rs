use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Full mark used for subjects without an explicit entry in `full_marks`.
pub const DEFAULT_FULL_MARK: u32 = 100;

/// One academic grading period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub grade: String,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
    /// Subjects in the order their scores were first entered.
    #[serde(default)]
    pub subjects: Vec<String>,
}

impl Term {
    pub fn new(grade: impl Into<String>) -> Self {
        Self {
            grade: grade.into(),
            scores: BTreeMap::new(),
            subjects: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Scores in entry order.
    pub fn ordered_scores(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.subjects
            .iter()
            .filter_map(|subject| self.scores.get(subject).map(|s| (subject.as_str(), *s)))
    }
}

/// The whole persisted state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gradebook {
    #[serde(rename = "dataset")]
    pub terms: BTreeMap<String, Term>,
    pub full_marks: BTreeMap<String, u32>,
    pub custom_subjects: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_term: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Excellent,
    Good,
    Passing,
    Failing,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Excellent, Level::Good, Level::Passing, Level::Failing];

    pub fn label(self) -> &'static str {
        match self {
            Level::Excellent => "Excellent",
            Level::Good => "Good",
            Level::Passing => "Passing",
            Level::Failing => "Failing",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Level::Excellent => 0,
            Level::Good => 1,
            Level::Passing => 2,
            Level::Failing => 3,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A score table row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEntry {
    pub subject: String,
    pub score: f64,
    pub full_mark: u32,
    pub level: Level,
}

impl ScoreEntry {
    pub fn is_failing(&self) -> bool {
        self.level == Level::Failing
    }
}

/// Formats a score without a trailing `.0` for whole numbers.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        let text = format!("{:.2}", score);
        text.trim_end_matches('0').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradebook_json_keys() {
        let mut book = Gradebook::default();
        let mut term = Term::new("Grade 7");
        term.scores.insert("Math".to_string(), 95.0);
        term.subjects.push("Math".to_string());
        book.terms.insert("2024-2025 Term 1".to_string(), term);

        let value = serde_json::to_value(&book).unwrap();
        assert!(value.get("dataset").is_some());
        assert!(value.get("full_marks").is_some());
        assert!(value.get("custom_subjects").is_some());
        assert!(value.get("current_term").is_none());
        assert_eq!(value["dataset"]["2024-2025 Term 1"]["scores"]["Math"], 95.0);
    }

    #[test]
    fn test_ordered_scores_follow_entry_order() {
        let mut term = Term::new("Grade 8");
        for (subject, score) in [("Physics", 70.0), ("Chinese", 88.0), ("Math", 91.0)] {
            term.scores.insert(subject.to_string(), score);
            term.subjects.push(subject.to_string());
        }
        let order: Vec<&str> = term.ordered_scores().map(|(s, _)| s).collect();
        assert_eq!(order, vec!["Physics", "Chinese", "Math"]);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(90.0), "90");
        assert_eq!(format_score(87.5), "87.5");
        assert_eq!(format_score(66.25), "66.25");
    }
}
