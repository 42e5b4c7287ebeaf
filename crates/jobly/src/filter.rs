//! Dynamic `WHERE` predicate composition.
//!
//! [`PredicateBuilder`] accumulates independently-optional conditions and
//! numbers each placeholder from the running length of its values list, so any
//! subset of conditions yields contiguous `$n` indices. [`JobFilter`] is the set
//! of search criteria for the jobs listing and [`build_filters`] turns it into a
//! [`PredicateFragment`].

use crate::value::Value;
use serde::Deserialize;

/// Output of predicate composition.
///
/// `text` is empty when no criteria applied; callers must then omit the
/// `WHERE` keyword entirely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateFragment {
    /// Predicates joined with ` AND ` (no `WHERE` keyword)
    pub text: String,
    /// Bound values, in placeholder order
    pub values: Vec<Value>,
}

impl PredicateFragment {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// ` WHERE <text>`, or an empty string when there are no predicates.
    pub fn where_clause(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.text)
        }
    }
}

/// Conjunctive predicate accumulator.
#[derive(Debug, Clone, Default)]
pub struct PredicateBuilder {
    /// Conditions (without leading AND)
    conditions: Vec<String>,
    /// Values bound by this builder
    values: Vec<Value>,
    /// Number of parameters already bound ahead of this fragment
    offset: usize,
}

impl PredicateBuilder {
    /// Placeholder numbering starts at `$1`.
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Placeholder numbering starts after `offset`.
    ///
    /// For example, `with_offset(2)` means the first placeholder is `$3`.
    pub fn with_offset(offset: usize) -> Self {
        Self {
            conditions: Vec::new(),
            values: Vec::new(),
            offset,
        }
    }

    /// Continue numbering after an existing values list.
    pub fn after(bound: &[Value]) -> Self {
        Self::with_offset(bound.len())
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Index the next bound value will get.
    pub fn next_placeholder(&self) -> usize {
        self.offset + self.values.len() + 1
    }

    fn bind(&mut self, column: &str, op: &str, value: Value) {
        let idx = self.next_placeholder();
        self.values.push(value);
        self.conditions.push(format!("{column} {op} ${idx}"));
    }

    /// `column >= $n`
    pub fn and_gte(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.bind(column, ">=", value.into());
        self
    }

    /// `column <= $n`
    pub fn and_lte(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.bind(column, "<=", value.into());
        self
    }

    /// `column = $n`
    pub fn and_eq(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.bind(column, "=", value.into());
        self
    }

    /// `column > 0`, no bound value.
    pub fn and_positive(&mut self, column: &str) -> &mut Self {
        self.conditions.push(format!("{column} > 0"));
        self
    }

    /// `column ILIKE $n` bound to `%text%`.
    pub fn and_contains_ci(&mut self, column: &str, text: &str) -> &mut Self {
        self.bind(column, "ILIKE", Value::Text(format!("%{text}%")));
        self
    }

    // ==================== Option-friendly helpers ====================

    pub fn and_gte_opt<T: Into<Value>>(&mut self, column: &str, value: Option<T>) -> &mut Self {
        if let Some(v) = value {
            self.and_gte(column, v);
        }
        self
    }

    /// Adds `column > 0` only for `Some(true)`; `Some(false)` and `None` add nothing.
    pub fn and_positive_if(&mut self, column: &str, flag: Option<bool>) -> &mut Self {
        if flag == Some(true) {
            self.and_positive(column);
        }
        self
    }

    pub fn and_contains_ci_opt(&mut self, column: &str, text: Option<&str>) -> &mut Self {
        if let Some(t) = text {
            self.and_contains_ci(column, t);
        }
        self
    }

    pub fn finish(self) -> PredicateFragment {
        PredicateFragment {
            text: self.conditions.join(" AND "),
            values: self.values,
        }
    }
}

/// Search criteria for the jobs listing.
///
/// Every criterion is independently optional; absent is distinct from
/// present-but-false/zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Lower bound on `salary`
    pub min_salary: Option<i32>,
    /// `Some(true)` keeps only jobs with positive `equity`
    pub has_equity: Option<bool>,
    /// Case-insensitive substring of `title`
    pub title: Option<String>,
}

impl JobFilter {
    pub const SALARY_COLUMN: &'static str = "salary";
    pub const EQUITY_COLUMN: &'static str = "equity";
    pub const TITLE_COLUMN: &'static str = "title";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_salary(mut self, min: i32) -> Self {
        self.min_salary = Some(min);
        self
    }

    pub fn has_equity(mut self, flag: bool) -> Self {
        self.has_equity = Some(flag);
        self
    }

    pub fn title(mut self, text: impl Into<String>) -> Self {
        self.title = Some(text.into());
        self
    }

    /// Append this filter's predicates to `builder`.
    ///
    /// Criteria are applied in a fixed order: `min_salary`, `has_equity`, `title`.
    pub fn apply(&self, builder: &mut PredicateBuilder) {
        builder
            .and_gte_opt(Self::SALARY_COLUMN, self.min_salary)
            .and_positive_if(Self::EQUITY_COLUMN, self.has_equity)
            .and_contains_ci_opt(Self::TITLE_COLUMN, self.title.as_deref());
    }
}

/// Compose the `WHERE` predicates for `filter`, numbering from `$1`.
pub fn build_filters(filter: &JobFilter) -> PredicateFragment {
    build_filters_after(filter, &[])
}

/// Compose the `WHERE` predicates for `filter`, numbering after `bound`.
///
/// The returned `values` hold only this fragment's parameters; the caller
/// appends them to `bound`.
pub fn build_filters_after(filter: &JobFilter, bound: &[Value]) -> PredicateFragment {
    let mut builder = PredicateBuilder::after(bound);
    filter.apply(&mut builder);
    builder.finish()
}
