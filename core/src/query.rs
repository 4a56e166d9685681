//! Filter and sort parameters for collection requests.
//!
//! # Design
//! The query string is assembled by literal concatenation in insertion
//! order: filters first, then `sort=<key>`, then `order=desc` for
//! descending sorts (ascending is the server's default and gets no
//! parameter). No percent-escaping is performed; callers are responsible
//! for well-formed keys and values.

use std::fmt::Display;

/// Builder for the query string of a list request.
#[derive(Debug, Clone, Default)]
pub struct Query {
    filters: Vec<(String, String)>,
    sort: Option<String>,
    descending: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `key=value` on matching entities.
    pub fn filter(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.filters.push((key.into(), value.to_string()));
        self
    }

    /// Sort the collection by the given property key.
    pub fn sort(mut self, key: impl Into<String>) -> Self {
        self.sort = Some(key.into());
        self
    }

    /// Reverse the sort direction.
    pub fn descending(mut self) -> Self {
        self.descending = true;
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.sort.is_none()
    }

    /// Render the query string, including the leading `?`, or an empty
    /// string when nothing was requested.
    pub fn to_query_string(&self) -> String {
        if self.is_empty() {
            return String::new();
        }

        let mut parts = Vec::with_capacity(self.filters.len() + 2);
        for (key, value) in &self.filters {
            parts.push(format!("{key}={value}"));
        }
        if let Some(sort) = &self.sort {
            parts.push(format!("sort={sort}"));
            if self.descending {
                parts.push("order=desc".to_string());
            }
        }

        format!("?{}", parts.join("&"))
    }
}
