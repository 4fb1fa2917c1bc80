//! JSON encoding of the persisted attempt list.
//!
//! The stored value is a plain JSON array of attempt records. A missing blob
//! or a literal `null` decodes to an empty list; anything else that is not an
//! array of valid attempts is reported as corrupted.

use quiz_core::model::Attempt;

use crate::repository::StorageError;

/// Encode attempts as a JSON array.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if encoding fails.
pub fn encode_attempts(attempts: &[Attempt]) -> Result<String, StorageError> {
    serde_json::to_string(attempts).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Decode a stored blob into attempts.
///
/// # Errors
///
/// Returns `StorageError::Serialization` if the blob is not valid JSON, is not
/// an array, or contains a record that violates attempt invariants.
pub fn decode_attempts(blob: Option<&str>) -> Result<Vec<Attempt>, StorageError> {
    let Some(blob) = blob else {
        return Ok(Vec::new());
    };

    let parsed: Option<Vec<Attempt>> =
        serde_json::from_str(blob).map_err(|e| StorageError::Serialization(e.to_string()))?;
    let attempts = parsed.unwrap_or_default();

    for (i, attempt) in attempts.iter().enumerate() {
        attempt
            .check()
            .map_err(|e| StorageError::Serialization(format!("attempt {i}: {e}")))?;
    }

    Ok(attempts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{ChapterFilter, Mode, Question};
    use quiz_core::time::fixed_now;

    fn attempt() -> Attempt {
        Attempt::record(
            fixed_now(),
            Mode::Test,
            &ChapterFilter::All,
            &[Question::new("Q", ["a", "b"], "a").with_source("PYQ 2021")],
            vec![Some("a".into())],
            Some(72),
        )
        .unwrap()
    }

    #[test]
    fn missing_and_null_decode_to_empty() {
        assert!(decode_attempts(None).unwrap().is_empty());
        assert!(decode_attempts(Some("null")).unwrap().is_empty());
        assert!(decode_attempts(Some("[]")).unwrap().is_empty());
    }

    #[test]
    fn encoded_list_decodes_back() {
        let stored = vec![attempt()];
        let blob = encode_attempts(&stored).unwrap();
        assert!(blob.starts_with('['));
        assert_eq!(decode_attempts(Some(&blob)).unwrap(), stored);
    }

    #[test]
    fn corrupted_blobs_are_errors() {
        for blob in ["{not json", "{}", "42", r#"[{"id":"x"}]"#] {
            let err = decode_attempts(Some(blob)).unwrap_err();
            assert!(matches!(err, StorageError::Serialization(_)), "{blob}");
        }
    }

    #[test]
    fn records_breaking_invariants_are_rejected() {
        let mut value = serde_json::to_value(vec![attempt()]).unwrap();
        value[0]["answers"] = serde_json::json!([]);
        let blob = value.to_string();
        assert!(decode_attempts(Some(&blob)).is_err());
    }
}
