//! Compiled route types
//!
//! A [`RouteData`] is built once by the manifest walk and never changes
//! afterwards. Its `pattern` and `generator` are two views of the same segment
//! list and must stay inverse to each other.

pub mod generator;
pub mod pattern;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::GenerateError;
use crate::segment::Part;

pub use generator::RouteGenerator;
pub use pattern::get_pattern;

/// Route parameters; `None` stands for a rest parameter that matched nothing
pub type Params = BTreeMap<String, Option<String>>;

/// How routes treat a trailing `/`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlash {
    /// Require it
    Always,
    /// Forbid it
    Never,
    /// Accept both spellings
    #[default]
    Ignore,
}

/// What a route file produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Page,
    Endpoint,
}

/// One compiled route
#[derive(Debug, Clone)]
pub struct RouteData {
    /// Display form, e.g. `/blog/[slug]`
    pub route: String,
    pub kind: RouteKind,
    /// Project-root relative path of the page module
    pub component: String,
    /// Dynamic parameter names, left to right, in capture-group order
    pub params: Vec<String>,
    /// Parts per path segment, after index-suffix merging
    pub segments: Vec<Vec<Part>>,
    pub pattern: Regex,
    pub generator: RouteGenerator,
    /// Set only when every segment is a single static part
    pub pathname: Option<String>,
    pub is_index: bool,
}

impl RouteData {
    /// Compiles a route from its segments
    pub fn new(
        component: impl Into<String>,
        kind: RouteKind,
        segments: Vec<Vec<Part>>,
        params: Vec<String>,
        trailing_slash: TrailingSlash,
        is_index: bool,
    ) -> Self {
        let pattern = get_pattern(&segments, trailing_slash);
        let generator = RouteGenerator::new(&segments, trailing_slash);
        let pathname = static_pathname(&segments);

        Self {
            route: join_segments(&segments),
            kind,
            component: component.into(),
            params,
            segments,
            pattern,
            generator,
            pathname,
            is_index,
        }
    }

    /// Whether the route has no dynamic parts at all
    pub fn is_static(&self) -> bool {
        self.pathname.is_some()
    }

    /// Whether `pathname` matches this route
    pub fn matches(&self, pathname: &str) -> bool {
        self.pattern.is_match(pathname)
    }

    /// Builds the concrete pathname for `params`
    ///
    /// # Examples
    ///
    /// ```
    /// use pagemill_router::route::{Params, RouteData, RouteKind, TrailingSlash};
    /// use pagemill_router::segment::Part;
    ///
    /// let route = RouteData::new(
    ///     "pages/blog/[slug].astro",
    ///     RouteKind::Page,
    ///     vec![vec![Part::Static("blog".into())], vec![Part::Param("slug".into())]],
    ///     vec!["slug".into()],
    ///     TrailingSlash::Always,
    ///     false,
    /// );
    ///
    /// let params = Params::from([("slug".to_string(), Some("hello".to_string()))]);
    /// assert_eq!(route.generate(&params).unwrap(), "/blog/hello/");
    /// assert_eq!(route.params_for("/blog/hello/"), Some(params));
    /// ```
    pub fn generate(&self, params: &Params) -> Result<String, GenerateError> {
        self.generator.generate(params)
    }

    /// Extracts and percent-decodes the params from a matching pathname
    ///
    /// Returns `None` when the pathname does not match. A rest parameter that
    /// captured nothing comes back as `None`, never as an empty string.
    pub fn params_for(&self, pathname: &str) -> Option<Params> {
        let captures = self.pattern.captures(pathname)?;

        let mut params = Params::new();
        let mut group = 1;
        for segment in &self.segments {
            let slots: Vec<&Part> = if segment.first().is_some_and(Part::is_spread) {
                segment.iter().take(1).collect()
            } else {
                segment.iter().filter(|p| p.is_dynamic()).collect()
            };

            for part in slots {
                let value = captures
                    .get(group)
                    .map(|m| m.as_str())
                    .filter(|s| !s.is_empty())
                    .map(decode_component);
                params.insert(part.content().to_string(), value);
                group += 1;
            }
        }

        Some(params)
    }
}

impl fmt::Display for RouteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.route, self.component)
    }
}

/// A matched route and the params decoded from the request path
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<RouteData>,
    pub params: Params,
}

fn decode_component(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

fn static_pathname(segments: &[Vec<Part>]) -> Option<String> {
    let all_static = segments
        .iter()
        .all(|segment| segment.len() == 1 && !segment[0].is_dynamic());
    if !all_static {
        return None;
    }

    let joined: Vec<&str> = segments.iter().map(|segment| segment[0].content()).collect();
    Some(format!("/{}", joined.join("/")))
}

fn join_segments(segments: &[Vec<Part>]) -> String {
    let joined: Vec<String> = segments
        .iter()
        .map(|segment| {
            segment
                .iter()
                .map(|part| match part {
                    Part::Static(text) => text.clone(),
                    Part::Param(name) => format!("[{name}]"),
                    Part::Rest(name) => format!("[...{name}]"),
                })
                .collect::<String>()
        })
        .collect();

    format!("/{}", joined.join("/")).to_lowercase()
}
