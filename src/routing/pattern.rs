//! Route pattern compilation.
//!
//! # Responsibilities
//! - Normalize a route template (trailing slashes, anchoring)
//! - Turn `:name` / `*name` markers into single-segment captures
//! - Turn a bare `*` into a greedy, unnamed wildcard
//! - Record parameter names in declaration order
//!
//! # Design Decisions
//! - Compiled once at registration, never recompiled
//! - Literal template text is regex-escaped
//! - Raw `Regex` patterns pass through and expose no parameter names

use std::fmt;
use std::sync::LazyLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Bytes escaped when a template is URI-encoded; everything a browser's
/// `encodeURI` leaves alone stays readable.
const URI_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// `:name`, `*name`, or a bare `*`.
static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([:*])([A-Za-z0-9_]+)|\*").expect("marker regex is valid")
});

const SEGMENT_CAPTURE: &str = "([^/]+)";
const WILDCARD: &str = "(?:.*)";
const OPTIONAL_TRAILING_SLASH: &str = "(?:/$|$)";

/// Upper bound on a compiled template's matcher, in bytes.
pub const DEFAULT_PATTERN_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Error raised when a template cannot be turned into a matcher.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid route pattern '{template}': {source}")]
    Regex {
        template: String,
        #[source]
        source: regex::Error,
    },
}

/// A route template or a pre-built matcher.
#[derive(Debug, Clone)]
pub enum RoutePattern {
    /// Path template using `:name` and `*` markers.
    Template(String),
    /// Pre-built matcher. Named groups are not extracted as parameters.
    Regex(Regex),
}

impl RoutePattern {
    /// URI-encode a template the way it is stored on a route.
    ///
    /// Raw matchers are returned unchanged.
    pub fn encoded(self) -> Self {
        match self {
            RoutePattern::Template(t) => {
                RoutePattern::Template(utf8_percent_encode(&t, URI_ENCODE_SET).to_string())
            }
            other => other,
        }
    }

    /// True for the literal root template `/`.
    pub fn is_root(&self) -> bool {
        matches!(self, RoutePattern::Template(t) if t == "/")
    }

    /// Compile into a matcher plus ordered parameter names.
    pub fn compile(&self) -> Result<CompiledPattern, PatternError> {
        self.compile_with_limit(DEFAULT_PATTERN_SIZE_LIMIT)
    }

    /// Like [`compile`](Self::compile), bounding the template's matcher to `size_limit` bytes.
    pub fn compile_with_limit(&self, size_limit: usize) -> Result<CompiledPattern, PatternError> {
        match self {
            RoutePattern::Regex(regex) => Ok(CompiledPattern {
                regex: Some(regex.clone()),
                param_names: Vec::new(),
            }),
            RoutePattern::Template(template) => compile_template(template, size_limit),
        }
    }

    /// Compile, degrading to [`CompiledPattern::never`] on failure.
    pub fn compile_or_never(&self, size_limit: usize) -> CompiledPattern {
        self.compile_with_limit(size_limit).unwrap_or_else(|e| {
            tracing::warn!(pattern = %self, error = %e, "Route pattern never matches");
            CompiledPattern::never()
        })
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutePattern::Template(t) => f.write_str(t),
            RoutePattern::Regex(r) => write!(f, "/{}/", r.as_str()),
        }
    }
}

impl From<&str> for RoutePattern {
    fn from(value: &str) -> Self {
        RoutePattern::Template(value.to_string())
    }
}

impl From<String> for RoutePattern {
    fn from(value: String) -> Self {
        RoutePattern::Template(value)
    }
}

impl From<Regex> for RoutePattern {
    fn from(value: Regex) -> Self {
        RoutePattern::Regex(value)
    }
}

/// Immutable matcher derived from a [`RoutePattern`].
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// `None` means the pattern degraded and never matches.
    regex: Option<Regex>,
    param_names: Vec<String>,
}

impl CompiledPattern {
    /// Matcher that rejects every path.
    pub fn never() -> Self {
        Self {
            regex: None,
            param_names: Vec::new(),
        }
    }

    pub fn regex(&self) -> Option<&Regex> {
        self.regex.as_ref()
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(path))
    }

    /// Capture groups 1..n for `path`, or `None` if it does not match.
    pub fn captures(&self, path: &str) -> Option<Vec<Option<String>>> {
        let caps = self.regex.as_ref()?.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|m| m.map(|m| m.as_str().to_string()))
                .collect(),
        )
    }
}

/// Strip trailing slashes and anchor the template at the start of the path.
fn clean(template: &str) -> String {
    let trimmed = template.trim_end_matches('/');
    let body = trimmed.trim_start_matches('/');
    let mut cleaned = String::with_capacity(body.len() + 1);
    cleaned.push('/');
    cleaned.push_str(body);
    cleaned
}

fn compile_template(template: &str, size_limit: usize) -> Result<CompiledPattern, PatternError> {
    let cleaned = clean(template);
    let mut pattern = String::with_capacity(cleaned.len() + 16);
    let mut param_names = Vec::new();
    pattern.push('^');

    let mut last = 0;
    for caps in MARKER.captures_iter(&cleaned) {
        let Some(whole) = caps.get(0) else { continue };
        pattern.push_str(&regex::escape(&cleaned[last..whole.start()]));
        match caps.get(2) {
            Some(name) => {
                param_names.push(name.as_str().to_string());
                pattern.push_str(SEGMENT_CAPTURE);
            }
            None => pattern.push_str(WILDCARD),
        }
        last = whole.end();
    }
    pattern.push_str(&regex::escape(&cleaned[last..]));

    // "/" cleans to "/" and would otherwise demand a slash before the suffix.
    if pattern == "^/" {
        pattern.truncate(1);
    }
    pattern.push_str(OPTIONAL_TRAILING_SLASH);

    let regex = RegexBuilder::new(&pattern)
        .size_limit(size_limit)
        .build()
        .map_err(|source| PatternError::Regex {
        template: template.to_string(),
        source,
    })?;

    Ok(CompiledPattern {
        regex: Some(regex),
        param_names,
    })
}
