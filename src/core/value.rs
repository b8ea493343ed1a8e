//! Dynamic values that snapshots are built from.
//!
//! Containers (strings, arrays, objects) are reference counted, so cloning a
//! value is cheap and untouched branches are shared between snapshots.
//! [`Value::same`] compares by identity: primitives by value, containers by
//! pointer. Structural comparison is available through `PartialEq`.

use indexmap::IndexMap;
use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;

/// A dynamically typed state value.
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(Arc<str>),
    Array(Arc<Vec<Value>>),
    Object(Arc<Object>),
}

/// Returned when a value that must be an object is something else.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("expected an object, found {found}")]
pub struct NotAnObject {
    pub found: &'static str,
}

impl Value {
    /// Name of the value's type, for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Identity comparison.
    ///
    /// Primitives and strings compare by value; arrays and objects compare by
    /// pointer, so two structurally equal but separately built containers are
    /// not the same value.
    ///
    /// ```rust
    /// use recall::Value;
    ///
    /// let a = Value::from(vec![Value::from(1)]);
    /// let b = Value::from(vec![Value::from(1)]);
    /// assert_eq!(a, b);
    /// assert!(!a.same(&b));
    /// assert!(a.same(&a.clone()));
    /// ```
    pub fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => numbers_equal(a, b),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    /// Convert into a `serde_json::Value`, copying the whole tree.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.to_string()),
            Self::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Self::Object(object) => serde_json::Value::Object(
                object
                    .iter()
                    .map(|(key, value)| (key.to_string(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if a == b {
        return true;
    }
    // 1 and 1.0 are the same number
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => numbers_equal(a, b),
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => Arc::ptr_eq(a, b) || a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

/// Insertion-ordered string-keyed mapping.
///
/// Re-inserting an existing key replaces its value in place; removal keeps the
/// relative order of the remaining keys.
#[derive(Clone, Debug, Default)]
pub struct Object {
    entries: IndexMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value, returning the previous value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl PartialEq for Object {
    /// Key order does not take part in equality.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v == value))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = Object::new();
        object.extend(iter);
        object
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Object {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// The whole observable state at one instant.
///
/// A snapshot is always an object at the top level. Cloning shares the
/// underlying object; [`Snapshot::ptr_eq`] tells whether two snapshots are the
/// same instance.
///
/// ```rust
/// use recall::Snapshot;
/// use serde_json::json;
///
/// let snapshot = Snapshot::try_from(json!({"count": 0})).unwrap();
/// assert_eq!(snapshot.get("count").and_then(|v| v.as_i64()), Some(0));
///
/// assert!(Snapshot::try_from(json!([1, 2])).is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Snapshot(Arc<Object>);

impl Snapshot {
    /// An empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_object(object: Object) -> Self {
        Self(Arc::new(object))
    }

    pub fn as_object(&self) -> &Object {
        &self.0
    }

    /// Whether both snapshots are the same instance.
    pub fn ptr_eq(a: &Snapshot, b: &Snapshot) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Shallow merge: every key of `self`, overwritten by every key of
    /// `partial`. Nested values are replaced wholesale.
    pub fn merged(&self, partial: &Object) -> Snapshot {
        let mut object = Object::clone(&self.0);
        for (key, value) in partial.iter() {
            object.insert(key, value.clone());
        }
        Snapshot::from_object(object)
    }

    /// The snapshot as a plain value sharing the same object.
    pub fn to_value(&self) -> Value {
        Value::Object(Arc::clone(&self.0))
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.to_value().to_json()
    }

    pub(crate) fn shared(&self) -> &Arc<Object> {
        &self.0
    }
}

impl Deref for Snapshot {
    type Target = Object;

    fn deref(&self) -> &Object {
        &self.0
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        Snapshot::ptr_eq(self, other) || self.0 == other.0
    }
}

impl From<Object> for Snapshot {
    fn from(object: Object) -> Self {
        Snapshot::from_object(object)
    }
}

impl From<Arc<Object>> for Snapshot {
    fn from(object: Arc<Object>) -> Self {
        Self(object)
    }
}

impl TryFrom<Value> for Snapshot {
    type Error = NotAnObject;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(object) => Ok(Self(object)),
            other => Err(NotAnObject {
                found: other.kind_name(),
            }),
        }
    }
}

impl TryFrom<serde_json::Value> for Snapshot {
    type Error = NotAnObject;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        Snapshot::try_from(Value::from(value))
    }
}

impl From<Snapshot> for Value {
    fn from(snapshot: Snapshot) -> Self {
        Value::Object(snapshot.0)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

macro_rules! impl_from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl From<f64> for Value {
    /// Non-finite floats have no number representation and become `Null`.
    fn from(f: f64) -> Self {
        Number::from_f64(f).map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Arc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(items))
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(Arc::new(object))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(option: Option<T>) -> Self {
        option.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::from(s),
            serde_json::Value::Array(items) => {
                Value::from(items.into_iter().map(Value::from).collect::<Vec<_>>())
            }
            serde_json::Value::Object(map) => Value::from(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect::<Object>(),
            ),
        }
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        value.to_json()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Object(object) => object.serialize(serializer),
        }
    }
}

impl Serialize for Object {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("any JSON-like value")
    }

    fn visit_bool<E: de::Error>(self, b: bool) -> Result<Value, E> {
        Ok(Value::Bool(b))
    }

    fn visit_i64<E: de::Error>(self, n: i64) -> Result<Value, E> {
        Ok(Value::from(n))
    }

    fn visit_u64<E: de::Error>(self, n: u64) -> Result<Value, E> {
        Ok(Value::from(n))
    }

    fn visit_f64<E: de::Error>(self, f: f64) -> Result<Value, E> {
        Ok(Value::from(f))
    }

    fn visit_str<E: de::Error>(self, s: &str) -> Result<Value, E> {
        Ok(Value::from(s))
    }

    fn visit_string<E: de::Error>(self, s: String) -> Result<Value, E> {
        Ok(Value::from(s))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::from(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut object = Object::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            object.insert(key, value);
        }
        Ok(Value::from(object))
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

impl<'de> Deserialize<'de> for Snapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Snapshot::try_from(value).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot(value: serde_json::Value) -> Snapshot {
        Snapshot::try_from(value).unwrap()
    }

    #[test]
    fn object_insert_keeps_position_of_existing_key() {
        let mut object = Object::new();
        object.insert("a", 1);
        object.insert("b", 2);
        let previous = object.insert("a", 3);

        assert_eq!(previous, Some(Value::from(1)));
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(object.get("a"), Some(&Value::from(3)));
    }

    #[test]
    fn object_remove_preserves_order() {
        let mut object: Object = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(object.remove("b"), Some(Value::from(2)));
        assert_eq!(object.remove("missing"), None);
        assert_eq!(object.keys().collect::<Vec<_>>(), vec!["a", "c"]);
    }

    #[test]
    fn wide_object_keeps_insertion_order_across_removals() {
        let mut object: Object = (0..500).map(|n| (format!("k{n}"), n)).collect();
        for n in (0..500).step_by(2) {
            object.remove(&format!("k{n}"));
        }

        assert_eq!(object.len(), 250);
        assert_eq!(object.get("k499"), Some(&Value::from(499)));
        assert!(!object.contains_key("k0"));
        assert_eq!(object.keys().take(3).collect::<Vec<_>>(), vec!["k1", "k3", "k5"]);
    }

    #[test]
    fn object_equality_ignores_key_order() {
        let a: Object = [("x", 1), ("y", 2)].into_iter().collect();
        let b: Object = [("y", 2), ("x", 1)].into_iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn same_compares_containers_by_pointer() {
        let object = Value::from(Object::new());
        let other = Value::from(Object::new());

        assert!(object.same(&object.clone()));
        assert!(!object.same(&other));
        assert_eq!(object, other);
    }

    #[test]
    fn same_compares_primitives_by_value() {
        assert!(Value::from(1).same(&Value::from(1)));
        assert!(Value::from(1).same(&Value::from(1.0)));
        assert!(Value::from("a").same(&Value::from(String::from("a"))));
        assert!(!Value::from(1).same(&Value::from("1")));
        assert!(!Value::Null.same(&Value::Bool(false)));
    }

    #[test]
    fn snapshot_rejects_non_objects() {
        let err = Snapshot::try_from(json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.found, "array");
        assert!(Snapshot::try_from(json!(null)).is_err());
        assert!(Snapshot::try_from(json!(5)).is_err());
    }

    #[test]
    fn merged_is_shallow() {
        let base = snapshot(json!({"a": {"x": 1, "y": 2}, "b": 1}));
        let partial: Object = [("a", Value::from(json!({"x": 9})))].into_iter().collect();

        let merged = base.merged(&partial);

        assert_eq!(merged.to_json(), json!({"a": {"x": 9}, "b": 1}));
        assert!(merged.get("b").unwrap().same(base.get("b").unwrap()));
    }

    #[test]
    fn json_round_trip_preserves_key_order() {
        let text = r#"{"z":1,"a":{"m":[1,2,null],"b":true},"s":"hi"}"#;
        let snapshot: Snapshot = serde_json::from_str(text).unwrap();

        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["z", "a", "s"]);
        assert_eq!(serde_json::to_string(&snapshot).unwrap(), text);
    }

    #[test]
    fn deserializing_non_object_snapshot_fails() {
        let result: Result<Snapshot, _> = serde_json::from_str("[1]");
        assert!(result.is_err());
    }

    #[test]
    fn non_finite_float_becomes_null() {
        assert!(Value::from(f64::NAN).is_null());
        assert_eq!(Value::from(1.5).as_f64(), Some(1.5));
    }
}
