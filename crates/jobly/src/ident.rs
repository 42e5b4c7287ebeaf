//! Column naming: semantic field names to physical columns.
//!
//! A [`ColumnMap`] is an override table, not a normalizer: a field without an
//! entry is used verbatim (case and format preserved).

use crate::error::{JoblyError, JoblyResult};
use std::collections::HashMap;

/// Lookup from semantic field name to physical column name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnMap {
    /// Compile-time table, defined once per entity type.
    Static(&'static [(&'static str, &'static str)]),
    /// Runtime table.
    Owned(HashMap<String, String>),
}

impl ColumnMap {
    /// A map with no overrides; every field resolves to itself.
    pub const IDENTITY: ColumnMap = ColumnMap::Static(&[]);

    pub const fn from_static(entries: &'static [(&'static str, &'static str)]) -> Self {
        ColumnMap::Static(entries)
    }

    /// Resolve a field to its column, falling back to the field itself.
    pub fn resolve<'a>(&'a self, field: &'a str) -> &'a str {
        let mapped = match self {
            ColumnMap::Static(entries) => entries
                .iter()
                .find(|(from, _)| *from == field)
                .map(|(_, to)| *to),
            ColumnMap::Owned(map) => map.get(field).map(String::as_str),
        };
        mapped.unwrap_or(field)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ColumnMap::Static(entries) => entries.is_empty(),
            ColumnMap::Owned(map) => map.is_empty(),
        }
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColumnMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ColumnMap::Owned(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Quote a column name as a Postgres delimited identifier.
///
/// Embedded `"` are doubled so the name can never close the quotes early; NUL is
/// not representable in an identifier and is rejected.
pub fn quote_ident(name: &str) -> JoblyResult<String> {
    if name.is_empty() {
        return Err(JoblyError::validation("Identifier cannot be empty"));
    }
    if name.contains('\0') {
        return Err(JoblyError::validation(
            "Identifier cannot contain NUL character",
        ));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_mapping() {
        let map = ColumnMap::from_static(&[("firstName", "first_name")]);
        assert_eq!(map.resolve("firstName"), "first_name");
    }

    #[test]
    fn resolve_falls_back_to_identity() {
        let map = ColumnMap::from_static(&[("firstName", "first_name")]);
        assert_eq!(map.resolve("age"), "age");
        assert_eq!(ColumnMap::IDENTITY.resolve("firstName"), "firstName");
    }

    #[test]
    fn owned_map_from_iter() {
        let map: ColumnMap = [("numEmployees", "num_employees")].into_iter().collect();
        assert_eq!(map.resolve("numEmployees"), "num_employees");
        assert!(!map.is_empty());
    }

    #[test]
    fn quote_plain_and_hostile() {
        assert_eq!(quote_ident("title").unwrap(), "\"title\"");
        assert_eq!(
            quote_ident("a\"; DROP TABLE jobs;--").unwrap(),
            "\"a\"\"; DROP TABLE jobs;--\""
        );
        assert!(quote_ident("").is_err());
        assert!(quote_ident("a\0b").is_err());
    }
}
