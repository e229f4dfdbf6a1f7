//! Path pattern matching.
//!
//! # Responsibilities
//! - Parse route strings (`/about`, `/api/users/:id`) into patterns
//! - Match a request path against a pattern, capturing the dynamic segment
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A parameter matches exactly one non-empty trailing segment
//! - No regex to guarantee O(n) matching

use crate::error::ApiError;

/// A compiled route path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPattern {
    /// Matches the path literally.
    Exact(String),
    /// Literal prefix followed by one captured segment.
    Param { prefix: String, name: String },
}

impl PathPattern {
    /// Parse a route string. A trailing `:name` segment becomes a parameter.
    pub fn parse(pattern: &str) -> Self {
        match pattern.rsplit_once('/') {
            Some((head, last)) if last.starts_with(':') && last.len() > 1 => PathPattern::Param {
                prefix: format!("{}/", head),
                name: last[1..].to_string(),
            },
            _ => PathPattern::Exact(pattern.to_string()),
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, PathPattern::Exact(_))
    }

    /// Match `path`, returning captured parameters on success.
    pub fn matches(&self, path: &str) -> Option<RouteParams> {
        match self {
            PathPattern::Exact(literal) => (literal == path).then(RouteParams::default),
            PathPattern::Param { prefix, name } => {
                let segment = path.strip_prefix(prefix.as_str())?;
                if segment.is_empty() || segment.contains('/') {
                    return None;
                }
                Some(RouteParams {
                    captured: Some((name.clone(), segment.to_string())),
                })
            }
        }
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathPattern::Exact(literal) => f.write_str(literal),
            PathPattern::Param { prefix, name } => write!(f, "{}:{}", prefix, name),
        }
    }
}

/// Values captured from the dynamic path segment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    captured: Option<(String, String)>,
}

impl RouteParams {
    /// Raw value of parameter `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captured
            .as_ref()
            .filter(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Parameter `name` as a numeric id. A missing or non-numeric value does
    /// not identify a resource, so it reads as an unmatched route.
    pub fn id(&self, name: &str) -> Result<u64, ApiError> {
        self.get(name)
            .and_then(|raw| raw.parse().ok())
            .ok_or(ApiError::RouteNotFound)
    }
}
