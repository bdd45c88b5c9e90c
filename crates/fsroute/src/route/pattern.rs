//! Path template compilation
//!
//! Turns a route template such as `/users/:id/posts` into an anchored,
//! case-insensitive matcher plus the ordered list of parameter names bound
//! by its capture groups.

use crate::error::{ResolveError, Result};
use crate::query::{QueryMap, QueryParser};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

// `:name` or `%name`, running to the end of the segment
static MARKER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[:%][^/]+").unwrap());

/// Capture group substituted for every parameter marker
const PARAM_CAPTURE: &str = "([^?/]+)";

/// Optional replacement for a trailing `/index` segment
/// (nothing, `/`, `/index`, `/:index`, `/%index`)
const INDEX_SUFFIX: &str = "(?:/(?:[:%]?index)?)?";

/// Named group holding everything after `?`
const QUERY_GROUP: &str = "query";

/// Result of matching a URL against a [`RoutePattern`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternMatch {
    /// Parameter name → captured segment text
    pub params: HashMap<String, String>,
    /// Parsed query string (empty when the URL has none)
    pub query: QueryMap,
}

/// Compiled form of a route template
///
/// # Examples
///
/// ```
/// use fsroute::route::RoutePattern;
/// use fsroute::query::UrlEncodedQuery;
///
/// let pattern = RoutePattern::compile("/users/:id").unwrap();
/// assert_eq!(pattern.param_names(), ["id"]);
///
/// let m = pattern.matches("/users/42?active=true", &UrlEncodedQuery::default()).unwrap();
/// assert_eq!(m.params["id"], "42");
/// assert_eq!(m.query["active"], "true");
///
/// assert!(pattern.matches("/users/42/edit", &UrlEncodedQuery::default()).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RoutePattern {
    template: String,
    regex: Regex,
    param_names: Vec<String>,
    is_index: bool,
}

impl RoutePattern {
    /// Compiles a template
    ///
    /// 1. Every `:name` / `%name` marker becomes a `([^?/]+)` capture group,
    ///    names are recorded left to right. Literal text is escaped.
    /// 2. A final segment of exactly `index` marks an index route; a trailing
    ///    `/index` becomes optional so `/foo/index` also answers `/foo`.
    /// 3. The body is anchored at the start and followed by either the end of
    ///    input or `?` and a query string. Matching ignores case.
    pub fn compile(template: &str) -> Result<Self> {
        let mut body = String::with_capacity(template.len() + 16);
        let mut param_names = Vec::new();
        let mut last = 0;

        for marker in MARKER_REGEX.find_iter(template) {
            body.push_str(&regex::escape(&template[last..marker.start()]));
            body.push_str(PARAM_CAPTURE);
            // markers are a single ASCII byte
            param_names.push(marker.as_str()[1..].to_string());
            last = marker.end();
        }
        let tail = &template[last..];
        body.push_str(&regex::escape(tail));

        // Markers run to the end of their segment, so only literal text
        // can leave `index` as the final one
        let is_index = tail.rsplit('/').next() == Some("index");

        if is_index {
            if let Some(stripped) = body.strip_suffix("/index") {
                body = format!("{stripped}{INDEX_SUFFIX}");
            }
        }

        let source = format!("(?i)^{body}(?:\\?(?P<{QUERY_GROUP}>.*)|$)");
        let regex = Regex::new(&source).map_err(|source| ResolveError::Pattern {
            template: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            param_names,
            is_index,
        })
    }

    /// Original template text
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Source of the compiled expression
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Parameter names in capture-group order
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Whether the template ends in an `index` segment
    pub fn is_index(&self) -> bool {
        self.is_index
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    /// Raw parameter captures in template order
    pub fn captures(&self, url: &str) -> Option<Vec<String>> {
        let caps = self.regex.captures(url)?;
        Some(
            (1..=self.param_names.len())
                .filter_map(|idx| caps.get(idx))
                .map(|m| m.as_str().to_string())
                .collect(),
        )
    }

    /// Matches a raw URL (path plus optional `?query`)
    ///
    /// Parameters are bound positionally; if a name repeats, the later
    /// capture overwrites the earlier one. The query portion, or an empty
    /// string, goes through `parser`. `None` is an ordinary negative result.
    pub fn matches(&self, url: &str, parser: &dyn QueryParser) -> Option<PatternMatch> {
        let caps = self.regex.captures(url)?;

        let params = self
            .param_names
            .iter()
            .enumerate()
            .filter_map(|(idx, name)| {
                caps.get(idx + 1)
                    .map(|value| (name.clone(), value.as_str().to_string()))
            })
            .collect();

        let raw_query = caps.name(QUERY_GROUP).map_or("", |m| m.as_str());

        Some(PatternMatch {
            params,
            query: parser.parse(raw_query),
        })
    }
}
