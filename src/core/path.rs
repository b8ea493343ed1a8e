//! Dotted paths into a snapshot.
//!
//! A path is parsed once into segment tokens. Lookup walks objects by key and
//! arrays by decimal index; assignment copies every ancestor on the way down
//! and shares everything else with the source tree.

use super::value::{Object, Snapshot, Value};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A sequence of key segments, written `a.b.c`.
///
/// Every dotted string is a valid path. Empty segments are ordinary keys:
/// `""` addresses the `""` key and `a..b` walks through a `""` key under `a`.
/// The root path has no segments and cannot be written as text.
///
/// ```rust
/// use recall::Path;
///
/// let path = Path::parse("settings.theme");
/// assert_eq!(path.segments(), ["settings", "theme"]);
/// assert_eq!(path.to_string(), "settings.theme");
///
/// assert_eq!(Path::parse("a..b").segments(), ["a", "", "b"]);
/// assert!(!Path::parse("").is_root());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// The empty path, addressing the snapshot itself.
    pub fn root() -> Self {
        Self::default()
    }

    /// Split `text` on dots. Never fails; empty segments are kept.
    pub fn parse(text: &str) -> Self {
        Self {
            segments: text.split('.').map(str::to_string).collect(),
        }
    }

    /// Build a path directly from segments, without parsing.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// This path extended by one key.
    pub fn child(&self, key: &str) -> Path {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(key.to_string());
        Path { segments }
    }

    /// Walk `snapshot` along this path.
    ///
    /// Returns `None` as soon as a segment is missing or the value reached so
    /// far cannot be traversed. The root path yields `None`, since a snapshot is
    /// not itself a [`Value`] slot.
    pub fn lookup<'a>(&self, snapshot: &'a Snapshot) -> Option<&'a Value> {
        let (first, rest) = self.segments.split_first()?;
        let mut current = snapshot.get(first)?;
        for segment in rest {
            current = step(current, segment)?;
        }
        Some(current)
    }

    /// A new snapshot with the leaf at this path set to `value`.
    ///
    /// Every ancestor is shallow-copied; untouched siblings keep their
    /// identity. Missing or non-container ancestors are replaced by fresh
    /// objects. An array ancestor is copied and indexed when the segment is an
    /// index no greater than its length (equal to the length appends).
    /// The root path leaves the snapshot unchanged.
    pub fn assign(&self, snapshot: &Snapshot, value: Value) -> Snapshot {
        let Some((first, rest)) = self.segments.split_first() else {
            return snapshot.clone();
        };
        let mut root = Object::clone(snapshot.as_object());
        let child = assign_in(root.get(first), rest, value);
        root.insert(first.as_str(), child);
        Snapshot::from_object(root)
    }
}

fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(object) => object.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn assign_in(node: Option<&Value>, segments: &[String], value: Value) -> Value {
    let Some((first, rest)) = segments.split_first() else {
        return value;
    };

    match node {
        Some(Value::Object(object)) => {
            let mut copy = Object::clone(object);
            let child = assign_in(copy.get(first), rest, value);
            copy.insert(first.as_str(), child);
            Value::Object(Arc::new(copy))
        }
        Some(Value::Array(items)) => match first.parse::<usize>() {
            Ok(index) if index <= items.len() => {
                let mut copy = Vec::clone(items);
                let child = assign_in(copy.get(index), rest, value);
                if index == copy.len() {
                    copy.push(child);
                } else {
                    copy[index] = child;
                }
                Value::Array(Arc::new(copy))
            }
            _ => fresh_object(first, rest, value),
        },
        _ => fresh_object(first, rest, value),
    }
}

fn fresh_object(key: &str, rest: &[String], value: Value) -> Value {
    let mut object = Object::new();
    object.insert(key, assign_in(None, rest, value));
    Value::Object(Arc::new(object))
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl FromStr for Path {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Path::parse(s))
    }
}

impl Serialize for Path {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Path {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Path::parse(&text))
    }
}
