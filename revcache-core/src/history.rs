//! History record: the structured half of a cached version pair.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{RevcacheResult, StorageError, VersionId};

/// Reserved field holding the asserted predecessor version.
pub const PREV_FIELD: &str = "prev";

/// Caller-supplied edit history, an arbitrary JSON object.
pub type HistoryPayload = Map<String, Value>;

/// Edit history for one file version plus its consistency marker.
///
/// Serialized as a single flat JSON object: the caller's payload fields and
/// a `prev` field (`null` when the version had no predecessor).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    #[serde(flatten)]
    payload: HistoryPayload,
    #[serde(default)]
    prev: Option<VersionId>,
}

impl HistoryRecord {
    /// Build a record. A `prev` key inside `payload` is replaced by `prev`.
    pub fn new(mut payload: HistoryPayload, prev: Option<VersionId>) -> Self {
        payload.remove(PREV_FIELD);
        Self { payload, prev }
    }

    pub fn payload(&self) -> &HistoryPayload {
        &self.payload
    }

    pub fn into_payload(self) -> HistoryPayload {
        self.payload
    }

    pub fn prev(&self) -> Option<&VersionId> {
        self.prev.as_ref()
    }

    /// The record as one JSON object, `prev` included.
    pub fn to_value(&self) -> Value {
        let mut object = self.payload.clone();
        object.insert(
            PREV_FIELD.to_string(),
            self.prev
                .as_ref()
                .map_or(Value::Null, |prev| Value::String(prev.as_str().to_string())),
        );
        Value::Object(object)
    }

    pub fn to_bytes(&self, name: &str) -> RevcacheResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| {
            StorageError::Encode {
                name: name.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    pub fn from_bytes(name: &str, bytes: &[u8]) -> RevcacheResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| {
            StorageError::Decode {
                name: name.to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> HistoryPayload {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_record_serializes_flat_with_prev() {
        let record = HistoryRecord::new(
            payload(json!({"serverVersion": "7.4", "changes": [{"user": "bob"}]})),
            VersionId::new("1699999999").ok(),
        );

        let bytes = record.to_bytes("history_1_2.json").expect("encode");
        let value: Value = serde_json::from_slice(&bytes).expect("valid json");

        assert_eq!(
            value,
            json!({"serverVersion": "7.4", "changes": [{"user": "bob"}], "prev": "1699999999"})
        );
        assert_eq!(value, record.to_value());
    }

    #[test]
    fn test_null_prev_roundtrip() {
        let record = HistoryRecord::new(payload(json!({"key": "abc"})), None);
        let bytes = record.to_bytes("h").expect("encode");
        let decoded = HistoryRecord::from_bytes("h", &bytes).expect("decode");

        assert_eq!(decoded, record);
        assert!(decoded.prev().is_none());
        assert_eq!(decoded.to_value()["prev"], Value::Null);
    }

    #[test]
    fn test_caller_prev_is_overwritten() {
        let record = HistoryRecord::new(
            payload(json!({"prev": "forged", "key": 1})),
            VersionId::new("real").ok(),
        );
        assert_eq!(record.prev().map(VersionId::as_str), Some("real"));
        assert!(!record.payload().contains_key(PREV_FIELD));
    }

    #[test]
    fn test_missing_prev_decodes_as_none() {
        let decoded = HistoryRecord::from_bytes("h", br#"{"key": 1}"#).expect("decode");
        assert!(decoded.prev().is_none());
    }

    #[test]
    fn test_malformed_bytes_are_decode_errors() {
        let err = HistoryRecord::from_bytes("history_1_2.json", b"{not json").unwrap_err();
        assert!(err.is_decode());

        let err = HistoryRecord::from_bytes("history_1_2.json", b"[1, 2]").unwrap_err();
        assert!(err.is_decode());
    }
}
