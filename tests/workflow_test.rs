use chrono::{Datelike, Local};
use score_analyzer::{AppConfig, Level, LocalStorage, ScoreAnalyzer, ScoreError};
use tempfile::TempDir;

fn open(dir: &TempDir) -> ScoreAnalyzer<LocalStorage, AppConfig> {
    let storage = LocalStorage::new(dir.path().to_str().unwrap().to_string());
    ScoreAnalyzer::open(storage, AppConfig::default()).unwrap()
}

#[test]
fn test_term_and_score_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let mut analyzer = open(&temp_dir);

    let year = Local::now().year();
    let first = analyzer.create_term(Some("Grade 7")).unwrap();
    assert_eq!(first, format!("{}-{} Term 1", year, year + 1));

    analyzer.add_score(None, "Math", "95").unwrap();
    analyzer.add_score(None, "Chinese", "80").unwrap();
    analyzer.add_score(None, "English", "59.5").unwrap();

    let second = analyzer.create_term(Some("Grade 8")).unwrap();
    assert_eq!(second, format!("{}-{} Term 2", year, year + 1));
    assert_eq!(analyzer.gradebook().current_term.as_deref(), Some(second.as_str()));

    // Physics is only offered from Grade 8
    analyzer.add_score(None, "Physics", "72").unwrap();
    analyzer.add_score(None, "Math", "88").unwrap();
    let err = analyzer.add_score(Some(&first), "Physics", "70").unwrap_err();
    assert!(matches!(err, ScoreError::UnknownSubject { .. }));

    let analysis = analyzer.analyze_term(Some(&first)).unwrap();
    assert_eq!(analysis.summary.subject_count, 3);
    assert_eq!(analysis.summary.highest, 95.0);
    assert_eq!(analysis.summary.lowest, 59.5);
    assert_eq!(analysis.distribution.count(Level::Excellent), 1);
    assert_eq!(analysis.distribution.count(Level::Good), 1);
    assert_eq!(analysis.distribution.count(Level::Failing), 1);

    let trend = analyzer.analyze_trend(&["Math".to_string()]).unwrap();
    assert_eq!(trend.series.len(), 1);
    let scores: Vec<f64> = trend.series[0].points.iter().map(|p| p.score).collect();
    assert_eq!(scores, vec![95.0, 88.0]);

    // 重新開啟後狀態一致
    let reopened = open(&temp_dir);
    assert_eq!(reopened.gradebook(), analyzer.gradebook());
}

#[test]
fn test_full_mark_changes_classification() {
    let temp_dir = TempDir::new().unwrap();
    let mut analyzer = open(&temp_dir);
    analyzer.create_term(None).unwrap();

    analyzer.set_full_mark("Chinese", "150").unwrap();
    analyzer.add_score(None, "Chinese", "135").unwrap();
    let err = analyzer.add_score(None, "Math", "120").unwrap_err();
    assert!(matches!(err, ScoreError::ScoreExceedsFullMark { full_mark: 100, .. }));

    let (_, entries) = analyzer.score_table(None).unwrap();
    assert_eq!(entries[0].full_mark, 150);
    assert_eq!(entries[0].level, Level::Excellent);
}

#[test]
fn test_custom_subject_workflow() {
    let temp_dir = TempDir::new().unwrap();
    let mut analyzer = open(&temp_dir);
    analyzer.create_term(Some("Grade 9")).unwrap();

    assert!(matches!(
        analyzer.add_score(None, "Music", "90").unwrap_err(),
        ScoreError::UnknownSubject { .. }
    ));
    analyzer.add_custom_subject("Grade 9", "  Music ").unwrap();
    analyzer.add_score(None, "Music", "90").unwrap();
    assert!(matches!(
        analyzer.add_custom_subject("Grade 9", "Music").unwrap_err(),
        ScoreError::DuplicateSubject { .. }
    ));

    analyzer.remove_score(None, "Music").unwrap();
    assert!(matches!(
        analyzer.analyze_term(None).unwrap_err(),
        ScoreError::EmptyTerm(_)
    ));
}

#[test]
fn test_operations_without_term() {
    let temp_dir = TempDir::new().unwrap();
    let mut analyzer = open(&temp_dir);

    assert!(matches!(
        analyzer.add_score(None, "Math", "90").unwrap_err(),
        ScoreError::NoTermSelected
    ));
    assert!(matches!(
        analyzer.select_term("2020-2021 Term 1").unwrap_err(),
        ScoreError::TermNotFound(_)
    ));
    assert!(matches!(
        analyzer.create_term(Some("Grade 12")).unwrap_err(),
        ScoreError::UnknownGrade(_)
    ));
    assert!(!temp_dir.path().join("scores.json").exists());
}
