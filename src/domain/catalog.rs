use serde::{Deserialize, Serialize};

/// A grade and the subjects every term of that grade offers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeDefinition {
    pub name: String,
    pub subjects: Vec<String>,
}

impl GradeDefinition {
    pub fn new(name: &str, subjects: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Ordered grade list. The first grade is the default for new terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GradeCatalog {
    grades: Vec<GradeDefinition>,
}

impl GradeCatalog {
    pub fn new(grades: Vec<GradeDefinition>) -> Self {
        Self { grades }
    }

    pub fn grades(&self) -> &[GradeDefinition] {
        &self.grades
    }

    pub fn grade_names(&self) -> impl Iterator<Item = &str> {
        self.grades.iter().map(|g| g.name.as_str())
    }

    pub fn contains(&self, grade: &str) -> bool {
        self.grades.iter().any(|g| g.name == grade)
    }

    pub fn default_grade(&self) -> Option<&str> {
        self.grades.first().map(|g| g.name.as_str())
    }

    /// Built-in subjects of a grade, empty for unknown grades.
    pub fn subjects(&self, grade: &str) -> &[String] {
        self.grades
            .iter()
            .find(|g| g.name == grade)
            .map(|g| g.subjects.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for GradeCatalog {
    fn default() -> Self {
        Self::new(vec![
            GradeDefinition::new(
                "Grade 7",
                &[
                    "Chinese",
                    "Math",
                    "English",
                    "Ethics",
                    "History",
                    "Geography",
                    "Biology",
                    "PE",
                ],
            ),
            GradeDefinition::new(
                "Grade 8",
                &[
                    "Chinese",
                    "Math",
                    "English",
                    "Physics",
                    "Ethics",
                    "History",
                    "Geography",
                    "Biology",
                    "PE",
                ],
            ),
            GradeDefinition::new(
                "Grade 9",
                &[
                    "Chinese",
                    "Math",
                    "English",
                    "Physics",
                    "Chemistry",
                    "History",
                    "Ethics",
                    "PE",
                ],
            ),
        ])
    }
}
