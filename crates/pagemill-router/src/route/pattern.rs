//! Route pattern synthesis
//!
//! Builds the anchored regex a request pathname is matched against. Capture
//! groups appear in the same order as the route's `params`.

use regex::Regex;

use super::TrailingSlash;
use crate::segment::Part;

const REST_GROUP: &str = r"(?:\/(.*?))?";
const PARAM_GROUP: &str = r"([^/]+?)";

/// Compiles the matching regex for a list of segments
///
/// # Examples
///
/// ```
/// use pagemill_router::route::{get_pattern, TrailingSlash};
/// use pagemill_router::segment::Part;
///
/// let segments = vec![vec![Part::Static("blog".into())], vec![Part::Param("slug".into())]];
/// let pattern = get_pattern(&segments, TrailingSlash::Always);
///
/// assert_eq!(pattern.as_str(), r"^\/blog\/([^/]+?)\/$");
/// assert!(pattern.is_match("/blog/hello/"));
/// assert!(!pattern.is_match("/blog/hello"));
/// ```
pub fn get_pattern(segments: &[Vec<Part>], trailing_slash: TrailingSlash) -> Regex {
    let body: String = segments.iter().map(|segment| segment_pattern(segment)).collect();

    let trailing = if segments.is_empty() {
        "$"
    } else {
        trailing_pattern(trailing_slash)
    };
    let body = if body.is_empty() { r"\/" } else { body.as_str() };

    let source = format!("^{body}{trailing}");
    Regex::new(&source).expect("route pattern is built from escaped parts")
}

fn segment_pattern(segment: &[Part]) -> String {
    // A rest segment swallows the whole segment, including what a merged
    // index suffix appended to it.
    if segment.first().is_some_and(Part::is_spread) {
        return REST_GROUP.to_string();
    }

    let mut out = String::from(r"\/");
    for part in segment {
        match part {
            Part::Static(text) => out.push_str(&regex::escape(&encode_static(text))),
            Part::Param(_) | Part::Rest(_) => out.push_str(PARAM_GROUP),
        }
    }
    out
}

fn trailing_pattern(trailing_slash: TrailingSlash) -> &'static str {
    match trailing_slash {
        TrailingSlash::Always => r"\/$",
        TrailingSlash::Never => "$",
        TrailingSlash::Ignore => r"\/?$",
    }
}

/// Static text as it appears in a request path
///
/// `?` and `#` would otherwise start the query or fragment; bracket escapes
/// are folded back so `%5Bx%5D.astro` serves `/[x]`.
pub(crate) fn encode_static(text: &str) -> String {
    text.replace('?', "%3F")
        .replace('#', "%23")
        .replace("%5B", "[")
        .replace("%5D", "]")
}
