use std::{collections::BTreeMap, fmt};

use crate::value::Value;

static NULL: Value = Value::Null;

/// A dotted field path such as `cart.total`.
///
/// Paths are read from `given` left-hand sides, rule targets and identifier
/// references in expressions. A path always has at least one segment.
///
/// # Examples
///
/// For `order.customer.tier` the segments are:
/// - `"order"`
/// - `"customer"`
/// - `"tier"`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<String>,
}

impl FieldPath {
    /// Builds a path from its segments; `None` when there are none or one is blank.
    pub fn from_segments<I, S>(segments: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return None;
        }
        Some(FieldPath { segments })
    }

    /// Parses `a.b.c`, tolerating blanks around the dots (`a . b . c`).
    pub fn parse(text: &str) -> Option<Self> {
        Self::from_segments(text.split('.').map(str::trim))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn split_last(&self) -> (&String, &[String]) {
        // Non-empty by construction
        let (last, parents) = self
            .segments
            .split_last()
            .expect("field paths have at least one segment");
        (last, parents)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

/// Per-test field store: a tree of mappings addressed by dotted paths.
///
/// Reads are total (anything missing is `null`) and writes create the
/// intermediate mappings they need. Keys are kept sorted so every rendering
/// of an environment is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    fields: BTreeMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves a path; a missing key or a non-mapping on the way yields `Null`.
    pub fn get(&self, path: &FieldPath) -> &Value {
        let (last, parents) = path.split_last();
        let mut current = self;
        for segment in parents {
            match current.fields.get(segment).and_then(Value::as_mapping) {
                Some(next) => current = next,
                None => return &NULL,
            }
        }
        current.fields.get(last).unwrap_or(&NULL)
    }

    /// Writes `value` at `path`, replacing any non-mapping intermediate with
    /// a fresh mapping.
    pub fn set(&mut self, path: &FieldPath, value: Value) {
        let (last, parents) = path.split_last();
        let mut current = self;
        for segment in parents {
            let slot = current
                .fields
                .entry(segment.clone())
                .or_insert_with(|| Value::Mapping(Environment::new()));
            if !matches!(slot, Value::Mapping(_)) {
                *slot = Value::Mapping(Environment::new());
            }
            current = match slot {
                Value::Mapping(next) => next,
                _ => unreachable!("slot was just made a mapping"),
            };
        }
        current.fields.insert(last.clone(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}={}", key, value)?;
        }
        f.write_str("}")
    }
}
