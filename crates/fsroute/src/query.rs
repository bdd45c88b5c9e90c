// File: src/query.rs
// Purpose: Query string parsing (`?key=value&key=other`)

use std::collections::HashMap;
use std::slice;

/// Default cap on the number of pairs read from one query string
pub const DEFAULT_MAX_KEYS: usize = 1000;

/// A decoded query value: one string, or every value of a repeated key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl QueryValue {
    /// First value (the only one for `Single`)
    pub fn first(&self) -> &str {
        match self {
            QueryValue::Single(value) => value,
            QueryValue::Multi(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }

    /// All values in order of appearance
    pub fn all(&self) -> &[String] {
        match self {
            QueryValue::Single(value) => slice::from_ref(value),
            QueryValue::Multi(values) => values,
        }
    }

    /// The value if the key appeared exactly once
    pub fn as_str(&self) -> Option<&str> {
        match self {
            QueryValue::Single(value) => Some(value),
            QueryValue::Multi(_) => None,
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(existing) => {
                let first = std::mem::take(existing);
                *self = QueryValue::Multi(vec![first, value]);
            }
            QueryValue::Multi(values) => values.push(value),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Single(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Single(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::Multi(values)
    }
}

impl PartialEq<str> for QueryValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for QueryValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

/// Decoded query string, keyed by parameter name
pub type QueryMap = HashMap<String, QueryValue>;

/// Turns the raw text after `?` into a [`QueryMap`].
///
/// Implemented for plain functions and closures, so a resolver can be handed
/// any parser without a wrapper type.
pub trait QueryParser: Send + Sync {
    fn parse(&self, raw: &str) -> QueryMap;
}

impl<F> QueryParser for F
where
    F: Fn(&str) -> QueryMap + Send + Sync,
{
    fn parse(&self, raw: &str) -> QueryMap {
        self(raw)
    }
}

/// `application/x-www-form-urlencoded` query parser
///
/// - pairs are separated by `&`, empty pairs are skipped
/// - a pair without `=` maps the key to an empty string
/// - `+` decodes to a space, `%XX` sequences are percent-decoded
/// - malformed escapes decode lossily instead of failing
/// - repeated keys collect into [`QueryValue::Multi`]
///
/// # Examples
///
/// ```
/// use fsroute::query::{QueryParser, QueryValue, UrlEncodedQuery};
///
/// let query = UrlEncodedQuery::default().parse("tag=a&tag=b&q=hello+world");
/// assert_eq!(query["q"], "hello world");
/// assert_eq!(query["tag"].all(), ["a", "b"]);
/// ```
#[derive(Debug, Clone)]
pub struct UrlEncodedQuery {
    max_keys: usize,
}

impl UrlEncodedQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits how many pairs are read; `0` means unlimited
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    pub fn max_keys(&self) -> usize {
        self.max_keys
    }
}

impl Default for UrlEncodedQuery {
    fn default() -> Self {
        Self {
            max_keys: DEFAULT_MAX_KEYS,
        }
    }
}

impl QueryParser for UrlEncodedQuery {
    fn parse(&self, raw: &str) -> QueryMap {
        let limit = if self.max_keys == 0 {
            usize::MAX
        } else {
            self.max_keys
        };

        let mut query = QueryMap::new();
        for pair in raw.split('&').filter(|pair| !pair.is_empty()).take(limit) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key);
            let value = decode_component(value);

            match query.get_mut(&key) {
                Some(existing) => existing.push(value),
                None => {
                    query.insert(key, QueryValue::Single(value));
                }
            }
        }
        query
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned(),
    }
}
