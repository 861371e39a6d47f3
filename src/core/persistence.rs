use crate::domain::model::Gradebook;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ScoreError};

const REQUIRED_KEYS: [&str; 3] = ["dataset", "full_marks", "custom_subjects"];

pub fn encode(gradebook: &Gradebook) -> Result<Vec<u8>> {
    let json = serde_json::to_string_pretty(gradebook)?;
    Ok(json.into_bytes())
}

/// Decodes and validates a saved gradebook. A `current_term` that no longer
/// names a term is dropped instead of failing the load.
pub fn decode(data: &[u8]) -> Result<Gradebook> {
    let value: serde_json::Value = serde_json::from_slice(data)?;
    let object = value.as_object().ok_or_else(|| ScoreError::DataFormatError {
        message: "top level must be a JSON object".to_string(),
    })?;

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(ScoreError::DataFormatError {
            message: format!("missing keys: {}", missing.join(", ")),
        });
    }

    let mut gradebook: Gradebook = serde_json::from_value(value)?;
    gradebook.check_consistency()?;

    if let Some(current) = &gradebook.current_term {
        if !gradebook.terms.contains_key(current) {
            tracing::warn!("Dropping unknown current term '{}'", current);
            gradebook.current_term = None;
        }
    }
    if gradebook.current_term.is_none() {
        gradebook.current_term = gradebook.terms.keys().next().cloned();
    }

    Ok(gradebook)
}

pub fn load<S: Storage>(storage: &S, path: &str) -> Result<Gradebook> {
    let data = storage.read_file(path)?;
    let gradebook = decode(&data)?;
    tracing::debug!("Loaded {} terms from {}", gradebook.terms.len(), path);
    Ok(gradebook)
}

/// Loads the working file, or starts empty when it does not exist yet.
pub fn load_or_default<S: Storage>(storage: &S, path: &str) -> Result<Gradebook> {
    if storage.exists(path) {
        load(storage, path)
    } else {
        tracing::info!("No data file at {}, starting with an empty gradebook", path);
        Ok(Gradebook::default())
    }
}

pub fn save<S: Storage>(storage: &S, path: &str, gradebook: &Gradebook) -> Result<()> {
    let data = encode(gradebook)?;
    storage.write_file(path, &data)?;
    tracing::debug!("Saved {} terms ({} bytes) to {}", gradebook.terms.len(), data.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Term;

    #[test]
    fn test_decode_file_without_current_term() {
        let data = r#"{
            "dataset": {
                "2024-2025 第1学期": {
                    "grade": "七年级",
                    "scores": {"语文": 95.0, "数学": 88.0},
                    "subjects": ["语文", "数学"]
                }
            },
            "full_marks": {"语文": 120},
            "custom_subjects": {}
        }"#;

        let book = decode(data.as_bytes()).unwrap();
        assert_eq!(book.terms.len(), 1);
        assert_eq!(book.full_marks["语文"], 120);
        // 沒有 current_term 時選第一個學期
        assert_eq!(book.current_term.as_deref(), Some("2024-2025 第1学期"));
    }

    #[test]
    fn test_decode_rejects_missing_keys() {
        let err = decode(br#"{"dataset": {}}"#).unwrap_err();
        match err {
            ScoreError::DataFormatError { message } => {
                assert!(message.contains("full_marks"));
                assert!(message.contains("custom_subjects"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_rejects_malformed_json() {
        assert!(matches!(
            decode(b"{not json").unwrap_err(),
            ScoreError::SerializationError(_)
        ));
        assert!(matches!(
            decode(b"[1, 2]").unwrap_err(),
            ScoreError::DataFormatError { .. }
        ));
    }

    #[test]
    fn test_encode_keeps_non_ascii() {
        let mut book = Gradebook::default();
        book.terms.insert("学期".to_string(), Term::new("七年级"));
        let text = String::from_utf8(encode(&book).unwrap()).unwrap();
        assert!(text.contains("七年级"));
        assert!(text.contains("\n  "));
    }

    #[test]
    fn test_dangling_current_term_is_replaced() {
        let data = r#"{"dataset": {"A": {"grade": "Grade 7"}}, "full_marks": {},
                      "custom_subjects": {}, "current_term": "Z"}"#;
        let book = decode(data.as_bytes()).unwrap();
        assert_eq!(book.current_term.as_deref(), Some("A"));
    }

    #[test]
    fn test_encode_is_deterministic() {
        let build = || {
            let mut book = Gradebook::default();
            let mut term = Term::new("Grade 8");
            for (subject, score) in [
                ("Physics", 70.0),
                ("Chinese", 88.0),
                ("Math", 91.0),
                ("English", 64.5),
                ("History", 79.0),
                ("PE", 95.0),
            ] {
                term.scores.insert(subject.to_string(), score);
                term.subjects.push(subject.to_string());
            }
            book.terms.insert("2024-2025 Term 1".to_string(), term);
            book
        };

        let first = encode(&build()).unwrap();
        let second = encode(&build()).unwrap();
        assert_eq!(first, second);

        let text = String::from_utf8(first).unwrap();
        let chinese = text.find("\"Chinese\"").unwrap();
        let physics = text.find("\"Physics\"").unwrap();
        assert!(chinese < physics);
    }
}
