use crate::utils::error::{Result, ScoreError};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ScoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ScoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

/// 回傳小寫副檔名；不在允許清單內時報錯
pub fn validate_file_extension(path: &str, allowed_extensions: &[&str]) -> Result<String> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();
    let extension = std::path::Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    if allowed_set.contains(extension.as_str()) {
        Ok(extension)
    } else {
        Err(ScoreError::UnsupportedFormat {
            extension: if extension.is_empty() {
                "(none)".to_string()
            } else {
                extension
            },
            expected: allowed_extensions
                .iter()
                .map(|ext| format!(".{}", ext))
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ScoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ScoreError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Parses a score typed by the user. Accepts non-negative decimals only.
pub fn parse_score(input: &str) -> Result<f64> {
    let trimmed = input.trim();
    let invalid = || ScoreError::InvalidScore {
        input: input.to_string(),
    };

    // 拒絕 "inf"、"NaN"、"1e3" 這類 f64 可以解析但不像分數的輸入
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(invalid());
    }

    let score: f64 = trimmed.parse().map_err(|_| invalid())?;
    if !score.is_finite() || score < 0.0 {
        return Err(invalid());
    }
    Ok(score)
}

pub fn parse_full_mark(input: &str) -> Result<u32> {
    let trimmed = input.trim();
    let invalid = || ScoreError::InvalidFullMark {
        input: input.to_string(),
    };

    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    match trimmed.parse::<u32>() {
        Ok(mark) if mark > 0 => Ok(mark),
        _ => Err(invalid()),
    }
}
