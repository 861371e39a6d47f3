//! Per-term summaries and cross-term trend series.

use crate::core::grading::{GradeThresholds, LevelDistribution};
use crate::domain::model::{Gradebook, ScoreEntry, Term};
use crate::utils::error::{Result, ScoreError};
use serde::Serialize;
use std::collections::BTreeSet;

/// Head-room above the largest full mark on chart value axes.
pub const AXIS_HEADROOM: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TermSummary {
    pub average: f64,
    pub highest: f64,
    pub lowest: f64,
    pub subject_count: usize,
}

pub fn summarize(scores: &[f64]) -> Option<TermSummary> {
    if scores.is_empty() {
        return None;
    }

    let sum: f64 = scores.iter().sum();
    let highest = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let lowest = scores.iter().copied().fold(f64::INFINITY, f64::min);

    Some(TermSummary {
        average: sum / scores.len() as f64,
        highest,
        lowest,
        subject_count: scores.len(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TermAnalysis {
    pub term: String,
    pub grade: String,
    pub entries: Vec<ScoreEntry>,
    pub summary: TermSummary,
    pub distribution: LevelDistribution,
    pub axis_max: f64,
}

/// Builds score rows for a term in entry order.
pub fn score_entries(
    term: &Term,
    full_mark_of: impl Fn(&str) -> u32,
    thresholds: &GradeThresholds,
) -> Vec<ScoreEntry> {
    term.ordered_scores()
        .map(|(subject, score)| {
            let full_mark = full_mark_of(subject);
            ScoreEntry {
                subject: subject.to_string(),
                score,
                full_mark,
                level: thresholds.classify(score, full_mark),
            }
        })
        .collect()
}

pub fn analyze_term(
    name: &str,
    term: &Term,
    full_mark_of: impl Fn(&str) -> u32,
    thresholds: &GradeThresholds,
) -> Result<TermAnalysis> {
    let entries = score_entries(term, full_mark_of, thresholds);
    let scores: Vec<f64> = entries.iter().map(|e| e.score).collect();
    let summary = summarize(&scores).ok_or_else(|| ScoreError::EmptyTerm(name.to_string()))?;
    let max_full_mark = entries.iter().map(|e| e.full_mark).max().unwrap_or(0);

    Ok(TermAnalysis {
        term: name.to_string(),
        grade: term.grade.clone(),
        distribution: LevelDistribution::from_entries(&entries),
        axis_max: f64::from(max_full_mark) * AXIS_HEADROOM,
        entries,
        summary,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub term: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSeries {
    pub subject: String,
    pub points: Vec<TrendPoint>,
}

/// One series per requested subject over terms in name order. Terms lacking
/// the subject are skipped; subjects never scored yield no series.
pub fn extract_trends(gradebook: &Gradebook, subjects: &[String]) -> Vec<TrendSeries> {
    subjects
        .iter()
        .filter_map(|subject| {
            let points: Vec<TrendPoint> = gradebook
                .terms
                .iter()
                .filter_map(|(name, term)| {
                    term.scores.get(subject).map(|score| TrendPoint {
                        term: name.clone(),
                        score: *score,
                    })
                })
                .collect();

            if points.is_empty() {
                None
            } else {
                Some(TrendSeries {
                    subject: subject.clone(),
                    points,
                })
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    /// Union of the terms the series touch, sorted by name.
    pub terms: Vec<String>,
    pub series: Vec<TrendSeries>,
    pub axis_max: f64,
}

pub fn analyze_trend(
    gradebook: &Gradebook,
    subjects: &[String],
    full_mark_of: impl Fn(&str) -> u32,
) -> Result<TrendAnalysis> {
    let series = extract_trends(gradebook, subjects);
    if series.is_empty() {
        return Err(ScoreError::validation(
            "none of the selected subjects has any recorded score",
        ));
    }

    let terms: BTreeSet<&str> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.term.as_str()))
        .collect();
    let max_full_mark = series
        .iter()
        .map(|s| full_mark_of(&s.subject))
        .max()
        .unwrap_or(0);
    let max_score = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.score))
        .fold(0.0, f64::max);

    Ok(TrendAnalysis {
        terms: terms.into_iter().map(str::to_string).collect(),
        axis_max: f64::from(max_full_mark).max(max_score) * AXIS_HEADROOM,
        series,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Level;

    fn term(grade: &str, scores: &[(&str, f64)]) -> Term {
        let mut term = Term::new(grade);
        for (subject, score) in scores {
            term.scores.insert(subject.to_string(), *score);
            term.subjects.push(subject.to_string());
        }
        term
    }

    #[test]
    fn test_summarize() {
        let summary = summarize(&[90.0, 75.0, 60.0]).unwrap();
        assert_eq!(summary.average, 75.0);
        assert_eq!(summary.highest, 90.0);
        assert_eq!(summary.lowest, 60.0);
        assert_eq!(summary.subject_count, 3);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_analyze_term_uses_per_subject_full_marks() {
        let t = term("Grade 7", &[("Chinese", 135.0), ("Math", 95.0), ("PE", 40.0)]);
        let full_mark_of = |subject: &str| if subject == "Chinese" { 150 } else { 100 };
        let analysis =
            analyze_term("2024-2025 Term 1", &t, full_mark_of, &GradeThresholds::default())
                .unwrap();

        assert_eq!(analysis.entries[0].level, Level::Excellent);
        assert_eq!(analysis.entries[2].level, Level::Failing);
        assert_eq!(analysis.distribution.count(Level::Excellent), 2);
        assert!((analysis.axis_max - 165.0).abs() < 1e-9);
        assert_eq!(analysis.summary.subject_count, 3);
    }

    #[test]
    fn test_analyze_empty_term_fails() {
        let t = term("Grade 7", &[]);
        let err = analyze_term("T1", &t, |_| 100, &GradeThresholds::default()).unwrap_err();
        assert!(matches!(err, ScoreError::EmptyTerm(name) if name == "T1"));
    }

    #[test]
    fn test_extract_trends_skips_missing_terms() {
        let mut book = Gradebook::default();
        book.terms.insert("2024-2025 Term 2".into(), term("Grade 7", &[("Math", 88.0)]));
        book.terms.insert(
            "2024-2025 Term 1".into(),
            term("Grade 7", &[("Math", 80.0), ("English", 70.0)]),
        );
        book.terms.insert("2025-2026 Term 3".into(), term("Grade 8", &[("English", 75.0)]));

        let series = extract_trends(
            &book,
            &["Math".to_string(), "English".to_string(), "Physics".to_string()],
        );
        assert_eq!(series.len(), 2);

        let math: Vec<(&str, f64)> = series[0]
            .points
            .iter()
            .map(|p| (p.term.as_str(), p.score))
            .collect();
        assert_eq!(math, vec![("2024-2025 Term 1", 80.0), ("2024-2025 Term 2", 88.0)]);
        assert_eq!(series[1].points.len(), 2);
    }

    #[test]
    fn test_analyze_trend_axis() {
        let mut book = Gradebook::default();
        book.terms.insert("A".into(), term("Grade 7", &[("Math", 80.0)]));
        book.terms.insert("B".into(), term("Grade 7", &[("English", 70.0)]));

        let trend = analyze_trend(&book, &["Math".to_string(), "English".to_string()], |_| 100).unwrap();
        assert_eq!(trend.terms, vec!["A".to_string(), "B".to_string()]);
        assert!((trend.axis_max - 110.0).abs() < 1e-9);

        assert!(analyze_trend(&book, &["Physics".to_string()], |_| 100).is_err());
    }
}
