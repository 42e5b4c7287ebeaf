//! Partial-update `SET` clause builder.
//!
//! Turns a sparse, ordered `field -> value` payload into a `SET` fragment whose
//! i-th placeholder is `$i` and binds the i-th element of the returned values.
//!
//! # Example
//!
//! ```ignore
//! use jobly::{ColumnMap, UpdatePayload, build_set_clause};
//!
//! let payload = UpdatePayload::new().set("firstName", "Aliya").set("age", 32);
//! let map = ColumnMap::from_static(&[("firstName", "first_name")]);
//!
//! let set = build_set_clause(&payload, &map)?;
//! assert_eq!(set.text, r#""first_name"=$1, "age"=$2"#);
//! ```

use crate::error::{JoblyError, JoblyResult};
use crate::ident::{ColumnMap, quote_ident};
use crate::value::Value;
use std::fmt::Write;

/// Ordered list of fields to change.
///
/// Order is significant: it fixes both the placeholder numbering and the order of
/// the bound values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdatePayload {
    fields: Vec<(String, Value)>,
}

impl UpdatePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Setting the same field twice keeps its first position and
    /// replaces the value.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// In-place form of [`UpdatePayload::set`].
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let mut payload = Self::new();
        for (k, v) in pairs {
            payload.insert(k, v);
        }
        payload
    }

    /// Build a payload from a JSON object, preserving document order.
    ///
    /// Only scalar members are accepted.
    pub fn from_json(json: serde_json::Value) -> JoblyResult<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(JoblyError::validation("update payload must be a JSON object"));
        };
        let mut payload = Self::new();
        for (field, value) in map {
            payload.insert(field, Value::try_from(value)?);
        }
        Ok(payload)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|(f, _)| f == field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(f, _)| f.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v))
    }
}

/// Output of [`build_set_clause`].
#[derive(Debug, Clone, PartialEq)]
pub struct SetFragment {
    /// `"col"=$1, "col2"=$2, ...` (no `SET` keyword)
    pub text: String,
    /// Bound values, in placeholder order
    pub values: Vec<Value>,
}

impl SetFragment {
    /// Index of the next free placeholder after this fragment.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }
}

/// Build the assignment list of an `UPDATE ... SET`.
///
/// Fails with [`JoblyError::Validation`] when the payload is empty; an empty
/// update is a caller error, never a no-op.
pub fn build_set_clause(payload: &UpdatePayload, columns: &ColumnMap) -> JoblyResult<SetFragment> {
    if payload.is_empty() {
        return Err(JoblyError::validation("no data supplied"));
    }

    let mut text = String::new();
    let mut values = Vec::with_capacity(payload.len());

    for (idx, (field, value)) in payload.iter().enumerate() {
        if idx > 0 {
            text.push_str(", ");
        }
        let column = quote_ident(columns.resolve(field))?;
        let _ = write!(&mut text, "{}=${}", column, idx + 1);
        values.push(value.clone());
    }

    Ok(SetFragment { text, values })
}

#[cfg(test)]
mod tests;
