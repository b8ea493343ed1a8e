//! Tagged encoding of snapshots for non-self-describing formats.
//!
//! `Value` deserializes by asking the format what comes next, which bincode
//! cannot answer. The binary checkpoint goes through this explicitly tagged
//! mirror instead.

use super::Checkpoint;
use crate::config::StoreConfig;
use crate::core::{Object, Snapshot, Value};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
enum WireValue {
    Null,
    Bool(bool),
    PosInt(u64),
    NegInt(i64),
    Float(f64),
    String(String),
    Array(Vec<WireValue>),
    Object(Vec<(String, WireValue)>),
}

type WireObject = Vec<(String, WireValue)>;

#[derive(Debug, Serialize, Deserialize)]
pub(super) struct WireCheckpoint {
    version: u32,
    id: Uuid,
    timestamp: DateTime<Utc>,
    config: StoreConfig,
    history: Vec<WireObject>,
    history_index: usize,
    current_state: WireObject,
}

impl WireCheckpoint {
    pub(super) fn version(&self) -> u32 {
        self.version
    }
}

fn encode_value(value: &Value) -> WireValue {
    match value {
        Value::Null => WireValue::Null,
        Value::Bool(b) => WireValue::Bool(*b),
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                WireValue::PosInt(u)
            } else if let Some(i) = n.as_i64() {
                WireValue::NegInt(i)
            } else {
                n.as_f64().map_or(WireValue::Null, WireValue::Float)
            }
        }
        Value::String(s) => WireValue::String(s.to_string()),
        Value::Array(items) => WireValue::Array(items.iter().map(encode_value).collect()),
        Value::Object(object) => WireValue::Object(encode_object(object)),
    }
}

fn encode_object(object: &Object) -> WireObject {
    object
        .iter()
        .map(|(key, value)| (key.to_string(), encode_value(value)))
        .collect()
}

fn decode_value(value: WireValue) -> Value {
    match value {
        WireValue::Null => Value::Null,
        WireValue::Bool(b) => Value::Bool(b),
        WireValue::PosInt(u) => Value::from(u),
        WireValue::NegInt(i) => Value::from(i),
        WireValue::Float(f) => Value::from(f),
        WireValue::String(s) => Value::from(s),
        WireValue::Array(items) => Value::from(items.into_iter().map(decode_value).collect::<Vec<_>>()),
        WireValue::Object(entries) => Value::from(decode_object(entries)),
    }
}

fn decode_object(entries: WireObject) -> Object {
    entries
        .into_iter()
        .map(|(key, value)| (key, decode_value(value)))
        .collect()
}

impl From<&Checkpoint> for WireCheckpoint {
    fn from(checkpoint: &Checkpoint) -> Self {
        Self {
            version: checkpoint.version,
            id: checkpoint.id,
            timestamp: checkpoint.timestamp,
            config: checkpoint.config.clone(),
            history: checkpoint
                .history
                .iter()
                .map(|snapshot| encode_object(snapshot))
                .collect(),
            history_index: checkpoint.history_index,
            current_state: encode_object(&checkpoint.current_state),
        }
    }
}

impl From<WireCheckpoint> for Checkpoint {
    fn from(wire: WireCheckpoint) -> Self {
        Self {
            version: wire.version,
            id: wire.id,
            timestamp: wire.timestamp,
            config: wire.config,
            history: wire
                .history
                .into_iter()
                .map(|entries| Snapshot::from_object(decode_object(entries)))
                .collect(),
            history_index: wire.history_index,
            current_state: Snapshot::from_object(decode_object(wire.current_state)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn numbers_keep_their_kind() {
        let value = Value::from(json!([1, -2, 2.5, u64::MAX]));
        let decoded = decode_value(encode_value(&value));
        assert_eq!(decoded, value);
        assert_eq!(decoded.as_array().unwrap()[1].as_i64(), Some(-2));
        assert_eq!(decoded.as_array().unwrap()[3].as_u64(), Some(u64::MAX));
    }

    #[test]
    fn objects_keep_key_order() {
        let value = Value::from(json!({"z": {"b": null, "a": "x"}, "y": [true]}));
        let decoded = decode_value(encode_value(&value));
        let object = decoded.as_object().unwrap();
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["z", "y"]);
        assert_eq!(
            object.get("z").unwrap().as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["b", "a"]
        );
    }
}
