/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::ApiParams;

/// Ordered request parameters, unique by name.
///
/// Insertion order is kept until [`Params::sort_by_name`] is called, which is only done
/// for signed requests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
        }
    }

    /// Copies the caller's pairs; a repeated name keeps its first position and last value
    pub fn from_pairs(pairs: &ApiParams<'_>) -> Self {
        // Room for method, api_key, auth_token and api_sig
        let mut params = Self::with_capacity(pairs.len() + 4);
        for (name, value) in pairs {
            params.insert(name, value);
        }
        params
    }

    /// Sets `name` to `value`, replacing the value in place if the name already exists
    pub fn insert(&mut self, name: &str, value: &str) {
        match self.pairs.iter_mut().find(|(n, _)| n == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.pairs.push((name.to_string(), value.to_string())),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.pairs.iter().position(|(n, _)| n == name)?;
        Some(self.pairs.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Sorts by parameter name comparing raw bytes
    pub fn sort_by_name(&mut self) {
        self.pairs.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    }

    /// Encodes the pairs as a query string.
    ///
    /// Every value is percent-encoded except the `method` value, which is a fixed-form
    /// identifier passed through untouched.
    pub fn to_query_string(&self) -> String {
        let capacity = self
            .pairs
            .iter()
            .map(|(n, v)| n.len() + v.len() * 3 + 2)
            .sum();
        let mut query = String::with_capacity(capacity);
        for (name, value) in &self.pairs {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(name);
            query.push('=');
            if name == "method" {
                query.push_str(value);
            } else {
                query.push_str(&urlencoding::encode(value));
            }
        }
        query
    }
}
