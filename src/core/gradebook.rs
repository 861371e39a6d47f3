//! Validated mutations of a [`Gradebook`].

use crate::domain::catalog::GradeCatalog;
use crate::domain::model::{Gradebook, Term};
use crate::utils::error::{Result, ScoreError};
use crate::utils::validation::{parse_full_mark, parse_score};
use std::collections::BTreeSet;

impl Gradebook {
    /// Name of a new term: `"{year}-{year+1} Term {n}"`, `n` counting from the
    /// number of existing terms and bumped until it is unused.
    pub fn next_term_name(&self, year: i32) -> String {
        let mut n = self.terms.len() + 1;
        loop {
            let name = format!("{}-{} Term {}", year, year + 1, n);
            if !self.terms.contains_key(&name) {
                return name;
            }
            n += 1;
        }
    }

    /// Creates a term and makes it current.
    pub fn create_term(
        &mut self,
        year: i32,
        grade: Option<&str>,
        catalog: &GradeCatalog,
    ) -> Result<String> {
        let grade = match grade {
            Some(grade) => grade,
            None => catalog.default_grade().ok_or_else(|| ScoreError::ConfigError {
                message: "no grades configured".to_string(),
            })?,
        };
        if !catalog.contains(grade) {
            return Err(ScoreError::UnknownGrade(grade.to_string()));
        }

        let name = self.next_term_name(year);
        self.terms.insert(name.clone(), Term::new(grade));
        self.current_term = Some(name.clone());
        tracing::debug!("Created term '{}' for {}", name, grade);
        Ok(name)
    }

    pub fn select_term(&mut self, name: &str) -> Result<()> {
        if !self.terms.contains_key(name) {
            return Err(ScoreError::TermNotFound(name.to_string()));
        }
        self.current_term = Some(name.to_string());
        Ok(())
    }

    /// Resolves an explicit term name, falling back to the current term.
    pub fn resolve_term<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Term)> {
        let name = name
            .or(self.current_term.as_deref())
            .ok_or(ScoreError::NoTermSelected)?;
        self.terms
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ScoreError::TermNotFound(name.to_string()))
    }

    fn resolve_term_mut(&mut self, name: Option<&str>) -> Result<(String, &mut Term)> {
        let name = name
            .map(str::to_string)
            .or_else(|| self.current_term.clone())
            .ok_or(ScoreError::NoTermSelected)?;
        match self.terms.get_mut(&name) {
            Some(term) => Ok((name, term)),
            None => Err(ScoreError::TermNotFound(name)),
        }
    }

    pub fn set_grade(
        &mut self,
        term: Option<&str>,
        grade: &str,
        catalog: &GradeCatalog,
    ) -> Result<String> {
        if !catalog.contains(grade) {
            return Err(ScoreError::UnknownGrade(grade.to_string()));
        }
        let (name, term) = self.resolve_term_mut(term)?;
        term.grade = grade.to_string();
        Ok(name)
    }

    /// Catalog subjects of `grade` followed by its custom subjects.
    pub fn subjects_for_grade(&self, grade: &str, catalog: &GradeCatalog) -> Vec<String> {
        let mut subjects = catalog.subjects(grade).to_vec();
        if let Some(custom) = self.custom_subjects.get(grade) {
            for subject in custom {
                if !subjects.contains(subject) {
                    subjects.push(subject.clone());
                }
            }
        }
        subjects
    }

    /// Every subject of every grade, sorted and without duplicates.
    pub fn all_subjects(&self, catalog: &GradeCatalog) -> Vec<String> {
        catalog
            .grades()
            .iter()
            .flat_map(|g| g.subjects.iter())
            .chain(self.custom_subjects.values().flatten())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Subjects that have at least one score in any term, sorted.
    pub fn recorded_subjects(&self) -> Vec<String> {
        self.terms
            .values()
            .flat_map(|t| t.subjects.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn full_mark(&self, subject: &str, default_full_mark: u32) -> u32 {
        self.full_marks
            .get(subject)
            .copied()
            .unwrap_or(default_full_mark)
    }

    /// Records a score typed by the user. Re-entering a subject overwrites its
    /// score and keeps its position in the table.
    pub fn add_score(
        &mut self,
        term: Option<&str>,
        subject: &str,
        input: &str,
        catalog: &GradeCatalog,
        default_full_mark: u32,
    ) -> Result<(String, f64)> {
        let (_, resolved) = self.resolve_term(term)?;
        let grade = resolved.grade.clone();

        let subject = subject.trim();
        if subject.is_empty() {
            return Err(ScoreError::validation("subject is required"));
        }
        if !self.subjects_for_grade(&grade, catalog).iter().any(|s| s == subject) {
            return Err(ScoreError::UnknownSubject {
                subject: subject.to_string(),
                grade,
            });
        }

        let score = parse_score(input)?;
        let full_mark = self.full_mark(subject, default_full_mark);
        if score > f64::from(full_mark) {
            return Err(ScoreError::ScoreExceedsFullMark {
                subject: subject.to_string(),
                score,
                full_mark,
            });
        }

        let (name, term) = self.resolve_term_mut(term)?;
        if term.scores.insert(subject.to_string(), score).is_none() {
            term.subjects.push(subject.to_string());
        }
        Ok((name, score))
    }

    pub fn remove_score(&mut self, term: Option<&str>, subject: &str) -> Result<f64> {
        let subject = subject.trim();
        let (name, term) = self.resolve_term_mut(term)?;
        let score = term.scores.remove(subject).ok_or_else(|| {
            ScoreError::validation(format!("{} has no score for '{}'", name, subject))
        })?;
        term.subjects.retain(|s| s != subject);
        Ok(score)
    }

    pub fn add_custom_subject(
        &mut self,
        grade: &str,
        name: &str,
        catalog: &GradeCatalog,
    ) -> Result<String> {
        if !catalog.contains(grade) {
            return Err(ScoreError::UnknownGrade(grade.to_string()));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(ScoreError::validation("subject name is required"));
        }
        if self.subjects_for_grade(grade, catalog).iter().any(|s| s == name) {
            return Err(ScoreError::DuplicateSubject {
                subject: name.to_string(),
                grade: grade.to_string(),
            });
        }

        self.custom_subjects
            .entry(grade.to_string())
            .or_default()
            .push(name.to_string());
        Ok(name.to_string())
    }

    pub fn set_full_mark(
        &mut self,
        subject: &str,
        input: &str,
        catalog: &GradeCatalog,
    ) -> Result<u32> {
        let subject = subject.trim();
        if subject.is_empty() {
            return Err(ScoreError::validation("subject is required"));
        }
        if !self.all_subjects(catalog).iter().any(|s| s == subject) {
            return Err(ScoreError::validation(format!(
                "'{}' is not a subject of any grade",
                subject
            )));
        }

        let mark = parse_full_mark(input)?;
        self.full_marks.insert(subject.to_string(), mark);
        Ok(mark)
    }

    /// Checks the invariants a freshly loaded gradebook must satisfy.
    pub fn check_consistency(&self) -> Result<()> {
        for (name, term) in &self.terms {
            let listed: BTreeSet<&str> = term.subjects.iter().map(String::as_str).collect();
            if listed.len() != term.subjects.len() {
                return Err(ScoreError::DataFormatError {
                    message: format!("term '{}' lists a subject twice", name),
                });
            }
            if listed.len() != term.scores.len()
                || term.scores.keys().any(|s| !listed.contains(s.as_str()))
            {
                return Err(ScoreError::DataFormatError {
                    message: format!("term '{}' has scores and subjects out of step", name),
                });
            }
            if let Some((subject, _)) = term
                .scores
                .iter()
                .find(|(_, score)| !score.is_finite() || **score < 0.0)
            {
                return Err(ScoreError::DataFormatError {
                    message: format!("term '{}' has an invalid score for '{}'", name, subject),
                });
            }
        }

        if let Some((subject, _)) = self.full_marks.iter().find(|(_, mark)| **mark == 0) {
            return Err(ScoreError::DataFormatError {
                message: format!("full mark of '{}' must be positive", subject),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_with_term() -> (Gradebook, GradeCatalog, String) {
        let catalog = GradeCatalog::default();
        let mut book = Gradebook::default();
        let name = book.create_term(2024, None, &catalog).unwrap();
        (book, catalog, name)
    }

    #[test]
    fn test_create_term_names_and_selects() {
        let (mut book, catalog, first) = book_with_term();
        assert_eq!(first, "2024-2025 Term 1");
        assert_eq!(book.terms[&first].grade, "Grade 7");

        let second = book.create_term(2024, Some("Grade 8"), &catalog).unwrap();
        assert_eq!(second, "2024-2025 Term 2");
        assert_eq!(book.current_term.as_deref(), Some(second.as_str()));
    }

    #[test]
    fn test_term_name_bumps_past_collisions() {
        let (mut book, catalog, _) = book_with_term();
        book.terms.insert("2024-2025 Term 2".to_string(), Term::new("Grade 7"));
        // 兩個學期已存在，下一個應為 Term 3
        let name = book.create_term(2024, None, &catalog).unwrap();
        assert_eq!(name, "2024-2025 Term 3");
    }

    #[test]
    fn test_create_term_rejects_unknown_grade() {
        let catalog = GradeCatalog::default();
        let mut book = Gradebook::default();
        let err = book.create_term(2024, Some("Grade 12"), &catalog).unwrap_err();
        assert!(matches!(err, ScoreError::UnknownGrade(_)));
        assert!(book.terms.is_empty());
    }

    #[test]
    fn test_add_score_requires_term() {
        let catalog = GradeCatalog::default();
        let mut book = Gradebook::default();
        let err = book.add_score(None, "Math", "90", &catalog, 100).unwrap_err();
        assert!(matches!(err, ScoreError::NoTermSelected));
    }

    #[test]
    fn test_add_score_validation_order() {
        let (mut book, catalog, _) = book_with_term();

        assert!(matches!(
            book.add_score(None, "  ", "90", &catalog, 100).unwrap_err(),
            ScoreError::ValidationError { .. }
        ));
        assert!(matches!(
            book.add_score(None, "Physics", "90", &catalog, 100).unwrap_err(),
            ScoreError::UnknownSubject { .. }
        ));
        assert!(matches!(
            book.add_score(None, "Math", "ninety", &catalog, 100).unwrap_err(),
            ScoreError::InvalidScore { .. }
        ));
        assert!(matches!(
            book.add_score(None, "Math", "101", &catalog, 100).unwrap_err(),
            ScoreError::ScoreExceedsFullMark { full_mark: 100, .. }
        ));
    }

    #[test]
    fn test_add_score_overwrites_in_place() {
        let (mut book, catalog, name) = book_with_term();
        book.add_score(None, "Math", "80", &catalog, 100).unwrap();
        book.add_score(None, "English", "70", &catalog, 100).unwrap();
        book.add_score(None, "Math", "95", &catalog, 100).unwrap();

        let term = &book.terms[&name];
        assert_eq!(term.subjects, vec!["Math".to_string(), "English".to_string()]);
        assert_eq!(term.scores["Math"], 95.0);
        assert!(book.check_consistency().is_ok());
    }

    #[test]
    fn test_full_mark_raises_limit() {
        let (mut book, catalog, _) = book_with_term();
        book.set_full_mark("Chinese", "150", &catalog).unwrap();
        assert_eq!(book.full_mark("Chinese", 100), 150);
        assert!(book.add_score(None, "Chinese", "135", &catalog, 100).is_ok());
        assert!(book.set_full_mark("Chinese", "0", &catalog).is_err());
        assert!(book.set_full_mark("Astronomy", "100", &catalog).is_err());
    }

    #[test]
    fn test_custom_subject_is_offered_for_its_grade() {
        let (mut book, catalog, _) = book_with_term();
        book.add_custom_subject("Grade 7", " Music ", &catalog).unwrap();

        assert!(book.subjects_for_grade("Grade 7", &catalog).contains(&"Music".to_string()));
        assert!(!book.subjects_for_grade("Grade 8", &catalog).contains(&"Music".to_string()));
        assert!(book.add_score(None, "Music", "88", &catalog, 100).is_ok());
        assert!(book.all_subjects(&catalog).contains(&"Music".to_string()));

        assert!(matches!(
            book.add_custom_subject("Grade 7", "Music", &catalog).unwrap_err(),
            ScoreError::DuplicateSubject { .. }
        ));
        assert!(matches!(
            book.add_custom_subject("Grade 7", "Math", &catalog).unwrap_err(),
            ScoreError::DuplicateSubject { .. }
        ));
        assert!(book.add_custom_subject("Grade 7", "", &catalog).is_err());
    }

    #[test]
    fn test_remove_score() {
        let (mut book, catalog, name) = book_with_term();
        book.add_score(None, "Math", "80", &catalog, 100).unwrap();
        assert_eq!(book.remove_score(None, "Math").unwrap(), 80.0);
        assert!(book.terms[&name].is_empty());
        assert!(book.remove_score(None, "Math").is_err());
    }

    #[test]
    fn test_remove_score_trims_subject() {
        let (mut book, catalog, name) = book_with_term();
        book.add_score(None, " Math ", "80", &catalog, 100).unwrap();
        assert_eq!(book.terms[&name].subjects, vec!["Math".to_string()]);
        assert_eq!(book.remove_score(None, " Math ").unwrap(), 80.0);
        assert!(book.terms[&name].is_empty());
    }

    #[test]
    fn test_select_and_set_grade() {
        let (mut book, catalog, first) = book_with_term();
        book.create_term(2024, None, &catalog).unwrap();
        book.select_term(&first).unwrap();
        book.set_grade(None, "Grade 9", &catalog).unwrap();
        assert_eq!(book.terms[&first].grade, "Grade 9");
        assert!(book.select_term("missing").is_err());
        assert!(book.set_grade(None, "Grade 10", &catalog).is_err());
    }

    #[test]
    fn test_consistency_detects_unlisted_score() {
        let (mut book, _, name) = book_with_term();
        book.terms
            .get_mut(&name)
            .unwrap()
            .scores
            .insert("Math".to_string(), 90.0);
        assert!(matches!(
            book.check_consistency().unwrap_err(),
            ScoreError::DataFormatError { .. }
        ));
    }
}
