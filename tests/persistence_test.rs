use score_analyzer::core::persistence;
use score_analyzer::{AppConfig, LocalStorage, ScoreAnalyzer, ScoreError};
use tempfile::TempDir;

fn storage(dir: &TempDir) -> LocalStorage {
    LocalStorage::new(dir.path().to_str().unwrap().to_string())
}

#[test]
fn test_save_and_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let mut analyzer = ScoreAnalyzer::open(storage(&temp_dir), AppConfig::default()).unwrap();
    let term = analyzer.create_term(Some("Grade 8")).unwrap();
    analyzer.add_score(None, "Physics", "77.5").unwrap();
    analyzer.add_custom_subject("Grade 8", "Art").unwrap();
    analyzer.set_full_mark("Art", "50").unwrap();
    analyzer.export_data("backup/export.json").unwrap();

    let other_dir = TempDir::new().unwrap();
    std::fs::copy(
        temp_dir.path().join("backup/export.json"),
        other_dir.path().join("import.json"),
    )
    .unwrap();

    let mut fresh = ScoreAnalyzer::open(storage(&other_dir), AppConfig::default()).unwrap();
    assert!(fresh.gradebook().terms.is_empty());
    fresh.import_data("import.json").unwrap();

    assert_eq!(fresh.gradebook(), analyzer.gradebook());
    assert_eq!(fresh.gradebook().current_term.as_deref(), Some(term.as_str()));
    assert!(other_dir.path().join("scores.json").exists());
}

#[test]
fn test_saved_file_keeps_legacy_keys() {
    let temp_dir = TempDir::new().unwrap();
    let mut analyzer = ScoreAnalyzer::open(storage(&temp_dir), AppConfig::default()).unwrap();
    analyzer.create_term(None).unwrap();
    analyzer.add_score(None, "Math", "90").unwrap();

    let raw = std::fs::read_to_string(temp_dir.path().join("scores.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for key in ["dataset", "full_marks", "custom_subjects", "current_term"] {
        assert!(value.get(key).is_some(), "missing {key}");
    }
}

#[test]
fn test_load_file_written_by_older_version() {
    let temp_dir = TempDir::new().unwrap();
    let legacy = r#"{
        "dataset": {
            "2023-2024 Term 1": {
                "grade": "Grade 7",
                "scores": {"Math": 92, "English": 61},
                "subjects": ["Math", "English"]
            }
        },
        "full_marks": {"Math": 120},
        "custom_subjects": {}
    }"#;
    std::fs::write(temp_dir.path().join("scores.json"), legacy).unwrap();

    let analyzer = ScoreAnalyzer::open(storage(&temp_dir), AppConfig::default()).unwrap();
    assert_eq!(
        analyzer.gradebook().current_term.as_deref(),
        Some("2023-2024 Term 1")
    );
    let (_, entries) = analyzer.score_table(None).unwrap();
    assert_eq!(entries[0].full_mark, 120);
}

#[test]
fn test_malformed_files_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let storage = storage(&temp_dir);

    std::fs::write(temp_dir.path().join("missing.json"), r#"{"dataset": {}}"#).unwrap();
    match persistence::load(&storage, "missing.json").unwrap_err() {
        ScoreError::DataFormatError { message } => {
            assert!(message.contains("full_marks"));
            assert!(message.contains("custom_subjects"));
        }
        other => panic!("unexpected error: {other:?}"),
    }

    std::fs::write(temp_dir.path().join("garbage.json"), "not json").unwrap();
    assert!(matches!(
        persistence::load(&storage, "garbage.json").unwrap_err(),
        ScoreError::SerializationError(_)
    ));

    let inconsistent = r#"{
        "dataset": {"T": {"grade": "Grade 7", "scores": {"Math": 90}, "subjects": []}},
        "full_marks": {},
        "custom_subjects": {}
    }"#;
    std::fs::write(temp_dir.path().join("scores.json"), inconsistent).unwrap();
    assert!(matches!(
        ScoreAnalyzer::open(storage, AppConfig::default()).err(),
        Some(ScoreError::DataFormatError { .. })
    ));
}

#[test]
fn test_same_input_writes_identical_files() {
    let run = || {
        let temp_dir = TempDir::new().unwrap();
        let mut analyzer = ScoreAnalyzer::open(storage(&temp_dir), AppConfig::default()).unwrap();
        analyzer.create_term(Some("Grade 7")).unwrap();
        for (subject, score) in [
            ("Math", "95"),
            ("Chinese", "88"),
            ("English", "72.5"),
            ("History", "81"),
            ("Biology", "67"),
            ("PE", "90"),
        ] {
            analyzer.add_score(None, subject, score).unwrap();
        }
        std::fs::read(temp_dir.path().join("scores.json")).unwrap()
    };

    let first = run();
    for _ in 0..4 {
        assert_eq!(run(), first);
    }
}
