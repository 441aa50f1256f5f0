use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Where in a request a locale candidate is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocaleSource {
    Path,
    Query,
    Header,
    Cookie,
}

impl LocaleSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Cookie => "cookie",
        }
    }
}

impl fmt::Display for LocaleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocaleSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(Self::Path),
            "query" => Ok(Self::Query),
            "header" => Ok(Self::Header),
            "cookie" => Ok(Self::Cookie),
            other => Err(other.to_string()),
        }
    }
}

/// One entry of the resolution order: the bag to read and the key(s) to read it under.
///
/// `nested_key` is only meaningful for cookies, whose value may itself be a mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupDescriptor {
    pub source: LocaleSource,
    pub key: String,
    pub nested_key: Option<String>,
}

impl LookupDescriptor {
    pub fn new(source: LocaleSource, key: impl Into<String>) -> Self {
        Self { source, key: key.into(), nested_key: None }
    }

    pub fn nested(source: LocaleSource, key: impl Into<String>, nested_key: impl Into<String>) -> Self {
        Self { source, key: key.into(), nested_key: Some(nested_key.into()) }
    }
}

/// Prioritized lookup descriptors, fixed at start-up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionOrder(Vec<LookupDescriptor>);

impl ResolutionOrder {
    pub fn new(descriptors: Vec<LookupDescriptor>) -> Self {
        Self(descriptors)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LookupDescriptor> {
        self.0.iter()
    }

    /// Header names referenced by the order, used to limit header extraction
    pub fn header_keys(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|d| d.source == LocaleSource::Header)
            .map(|d| d.key.as_str())
    }
}

/// A single request attribute, possibly multi-valued (repeated query keys, ranked headers)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Single(String),
    Multi(Vec<String>),
}

impl AttrValue {
    /// Non-empty candidates in preference order; `None` when nothing usable is present
    pub fn candidates(&self) -> Option<Vec<&str>> {
        let values: Vec<&str> = match self {
            Self::Single(value) => vec![value.as_str()],
            Self::Multi(values) => values.iter().map(String::as_str).collect(),
        };

        let values: Vec<&str> = values.into_iter().filter(|v| !v.is_empty()).collect();
        if values.is_empty() { None } else { Some(values) }
    }

    /// Append another value, turning a single value into a multi-value
    pub fn push(&mut self, value: String) {
        match self {
            Self::Single(existing) => {
                let first = std::mem::take(existing);
                *self = Self::Multi(vec![first, value]);
            },
            Self::Multi(values) => values.push(value),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for AttrValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multi(values)
    }
}

impl From<Vec<&str>> for AttrValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multi(values.into_iter().map(str::to_string).collect())
    }
}

/// Cookie state: either a plain string or a structured value supporting a second lookup level
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieValue {
    Plain(String),
    Structured(HashMap<String, AttrValue>),
}

/// Read-only projection of the request attributes the resolver consults
#[derive(Debug, Clone, Default)]
pub struct RequestView {
    pub path: HashMap<String, AttrValue>,
    pub query: HashMap<String, AttrValue>,
    /// Keys are lowercase header names
    pub headers: HashMap<String, AttrValue>,
    pub cookies: HashMap<String, CookieValue>,
}

impl RequestView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.path.insert(key.into(), value.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_header(mut self, key: &str, value: impl Into<AttrValue>) -> Self {
        self.headers.insert(key.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_cookie(mut self, key: impl Into<String>, value: CookieValue) -> Self {
        self.cookies.insert(key.into(), value);
        self
    }

    /// Candidate set for one descriptor, applying the two-level lookup for cookies
    pub fn candidates(&self, descriptor: &LookupDescriptor) -> Option<Vec<&str>> {
        let value = match descriptor.source {
            LocaleSource::Path => self.path.get(&descriptor.key),
            LocaleSource::Query => self.query.get(&descriptor.key),
            LocaleSource::Header => self.headers.get(&descriptor.key.to_ascii_lowercase()),
            LocaleSource::Cookie => {
                let cookie = self.cookies.get(&descriptor.key)?;
                return match (cookie, descriptor.nested_key.as_deref()) {
                    (CookieValue::Structured(inner), Some(nested)) => {
                        inner.get(nested).and_then(AttrValue::candidates)
                    },
                    (CookieValue::Plain(value), None) if !value.is_empty() => {
                        Some(vec![value.as_str()])
                    },
                    _ => None,
                };
            },
        }?;

        value.candidates()
    }

    /// Whether the route declared the descriptor's path parameter, even if it is empty
    pub fn declares_path_param(&self, descriptor: &LookupDescriptor) -> bool {
        descriptor.source == LocaleSource::Path && self.path.contains_key(&descriptor.key)
    }
}

/// Result of resolving one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Resolved { locale: String, source: LocaleSource },
    DefaultApplied(String),
    Rejected,
}

/// Body of `GET /api/locales`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupportedLocalesResponse {
    pub supported: Vec<String>,
    pub default: String,
}

/// Body of the locale echo endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLocaleResponse {
    pub locale: String,
}
