// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Table query building blocks: credentials, equality filters and paging.

use serde_json::Value;

/// Which credential a provider call is made with.
///
/// `Anon` and `User` are subject to the project's row-level security;
/// `Elevated` uses the service-role key and bypasses it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credential<'a> {
    /// Public anon key only.
    Anon,
    /// The caller's own access token.
    User(&'a str),
    /// Service-role key.
    Elevated,
}

/// Conjunction of `column = value` clauses.
///
/// Clauses keep insertion order so the rendered query is deterministic.
/// Only exact equality is supported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter matching a single column.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new().and_eq(column, value)
    }

    /// Add another equality clause. A repeated column replaces the earlier value.
    pub fn and_eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        let column = column.into();
        let value = value.into();
        match self.clauses.iter_mut().find(|(c, _)| *c == column) {
            Some(existing) => existing.1 = value,
            None => self.clauses.push((column, value)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render as PostgREST query pairs (`column=eq.value`, `column=is.null`).
    pub fn to_query(&self) -> Vec<(String, String)> {
        self.clauses
            .iter()
            .map(|(column, value)| (column.clone(), render_operand(value)))
            .collect()
    }
}

fn render_operand(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{s}"),
        Value::Bool(b) => format!("eq.{b}"),
        Value::Number(n) => format!("eq.{n}"),
        other => format!("eq.{other}"),
    }
}

/// Offset pagination pushed down to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: usize,
    pub limit: usize,
}

impl Page {
    pub fn new(skip: usize, limit: usize) -> Self {
        Self { skip, limit }
    }

    pub fn to_query(&self) -> Vec<(String, String)> {
        vec![
            ("offset".to_string(), self.skip.to_string()),
            ("limit".to_string(), self.limit.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_renders_equality_clauses_in_order() {
        let filter = Filter::eq("owner_id", "u-1").and_eq("id", 7).and_eq("archived", false);
        assert_eq!(
            filter.to_query(),
            vec![
                ("owner_id".to_string(), "eq.u-1".to_string()),
                ("id".to_string(), "eq.7".to_string()),
                ("archived".to_string(), "eq.false".to_string()),
            ]
        );
    }

    #[test]
    fn null_renders_as_is_null() {
        let filter = Filter::eq("deleted_at", json!(null));
        assert_eq!(
            filter.to_query(),
            vec![("deleted_at".to_string(), "is.null".to_string())]
        );
    }

    #[test]
    fn repeated_column_keeps_last_value() {
        let filter = Filter::eq("id", 1).and_eq("id", 2);
        assert_eq!(filter.to_query(), vec![("id".to_string(), "eq.2".to_string())]);
    }

    #[test]
    fn page_renders_offset_and_limit() {
        assert_eq!(
            Page::new(20, 10).to_query(),
            vec![
                ("offset".to_string(), "20".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }
}
