//! Segment tokenizer
//!
//! Turns one filesystem path segment (`about`, `[id].json`, `[...slug]`) into
//! typed [`Part`]s. Validation runs first and rejects anything that would
//! produce an ambiguous pattern.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::RouteValidationError;

static DYNAMIC_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(.+?\(.+?\)|.+?)\]").expect("valid split pattern"));
static PARAM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\.\.\.)?[a-zA-Z_$][a-zA-Z0-9_$]*$").expect("valid param pattern"));
static TRAILING_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^(]+)$").expect("valid name pattern"));
static REST_WITH_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".+\[\.\.\.[^\]]+\]").expect("valid rest pattern"));
static REST_WITH_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\.\.\.[^\]]+\].+").expect("valid rest pattern"));

/// One token of a path segment
///
/// # Examples
///
/// ```
/// use pagemill_router::segment::{parse_segment, Part};
///
/// let parts = parse_segment("[id].json", "pages/[id].json.ts").unwrap();
/// assert_eq!(parts, vec![Part::Param("id".into()), Part::Static(".json".into())]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Part {
    /// Literal text
    Static(String),
    /// `[name]`, matches exactly one path segment
    Param(String),
    /// `[...name]`, matches zero or more path segments
    Rest(String),
}

impl Part {
    /// Literal text for static parts, parameter name (without `...`) otherwise
    pub fn content(&self) -> &str {
        match self {
            Part::Static(s) | Part::Param(s) | Part::Rest(s) => s,
        }
    }

    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Part::Static(_))
    }

    pub fn is_spread(&self) -> bool {
        matches!(self, Part::Rest(_))
    }
}

/// Rejects segment spellings that cannot be compiled into a route
///
/// Checks run in a fixed order and the first failure wins:
///
/// 1. `$` prefix (legacy collection syntax)
/// 2. adjacent groups such as `[a][b]`
/// 3. unbalanced `[` / `]`
/// 4. a rest parameter sharing its segment with other text
///
/// Parameter names are checked later, during tokenization: they may contain
/// `[a-zA-Z0-9_$]` but must not start with a digit.
pub fn validate_segment(segment: &str, file: &str) -> Result<(), RouteValidationError> {
    let file = file.to_string();

    if segment.starts_with('$') {
        return Err(RouteValidationError::LegacySyntax { file });
    }
    if segment.contains("][") {
        return Err(RouteValidationError::UnseparatedParams { file });
    }
    if count_occurrences('[', segment) != count_occurrences(']', segment) {
        return Err(RouteValidationError::UnbalancedBrackets { file });
    }
    if REST_WITH_PREFIX.is_match(segment) || REST_WITH_SUFFIX.is_match(segment) {
        return Err(RouteValidationError::RestNotStandalone { file });
    }

    Ok(())
}

/// Validates and tokenizes one segment
///
/// Text outside brackets becomes [`Part::Static`]; each bracket group becomes
/// a [`Part::Param`] or, when the name starts with `...`, a [`Part::Rest`].
pub fn parse_segment(segment: &str, file: &str) -> Result<Vec<Part>, RouteValidationError> {
    validate_segment(segment, file)?;
    get_parts(segment, file)
}

fn get_parts(segment: &str, file: &str) -> Result<Vec<Part>, RouteValidationError> {
    let mut parts = Vec::new();
    let mut last = 0;

    for caps in DYNAMIC_SPLIT.captures_iter(segment) {
        let whole = caps.get(0).expect("group 0 always participates");
        push_static(&mut parts, &segment[last..whole.start()]);
        parts.push(dynamic_part(&caps[1], file)?);
        last = whole.end();
    }
    push_static(&mut parts, &segment[last..]);

    Ok(parts)
}

fn push_static(parts: &mut Vec<Part>, text: &str) {
    if !text.is_empty() {
        parts.push(Part::Static(text.to_string()));
    }
}

fn dynamic_part(group: &str, file: &str) -> Result<Part, RouteValidationError> {
    let name = TRAILING_NAME
        .captures(group)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .filter(|name| PARAM_NAME.is_match(name))
        .ok_or_else(|| RouteValidationError::InvalidParamName {
            file: file.to_string(),
        })?;

    Ok(match name.strip_prefix("...") {
        Some(rest) => Part::Rest(rest.to_string()),
        None => Part::Param(name.to_string()),
    })
}

fn count_occurrences(needle: char, haystack: &str) -> usize {
    haystack.chars().filter(|&c| c == needle).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(segment: &str) -> Vec<Part> {
        parse_segment(segment, "pages/test.astro").unwrap()
    }

    #[test]
    fn test_static_segment() {
        assert_eq!(parts("about"), vec![Part::Static("about".into())]);
    }

    #[test]
    fn test_param_segment() {
        assert_eq!(parts("[id]"), vec![Part::Param("id".into())]);
    }

    #[test]
    fn test_rest_segment_strips_ellipsis() {
        let p = parts("[...slug]");
        assert_eq!(p, vec![Part::Rest("slug".into())]);
        assert_eq!(p[0].content(), "slug");
        assert!(p[0].is_spread());
        assert!(p[0].is_dynamic());
    }

    #[test]
    fn test_mixed_segment() {
        assert_eq!(
            parts("[file].[ext]"),
            vec![
                Part::Param("file".into()),
                Part::Static(".".into()),
                Part::Param("ext".into()),
            ]
        );
        assert_eq!(
            parts("f[xx]"),
            vec![Part::Static("f".into()), Part::Param("xx".into())]
        );
    }

    #[test]
    fn test_paren_suffix_after_group_is_literal() {
        assert_eq!(
            parts("[id](.json)"),
            vec![Part::Param("id".into()), Part::Static("(.json)".into())]
        );
    }

    #[test]
    fn test_dollar_in_name_is_allowed() {
        assert_eq!(parts("[$id]"), vec![Part::Param("$id".into())]);
    }

    #[test]
    fn test_rejects_adjacent_params() {
        let err = parse_segment("[a][b]", "pages/[a][b].astro").unwrap_err();
        assert_eq!(
            err,
            RouteValidationError::UnseparatedParams {
                file: "pages/[a][b].astro".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "Invalid route pages/[a][b].astro - parameters must be separated"
        );
    }

    #[test]
    fn test_rejects_non_standalone_rest() {
        assert!(matches!(
            parse_segment("x[...y]", "f"),
            Err(RouteValidationError::RestNotStandalone { .. })
        ));
        assert!(matches!(
            parse_segment("[...y]z", "f"),
            Err(RouteValidationError::RestNotStandalone { .. })
        ));
        assert!(matches!(
            parse_segment("foo-[...rest]-bar", "f"),
            Err(RouteValidationError::RestNotStandalone { .. })
        ));
    }

    #[test]
    fn test_rejects_invalid_param_name() {
        assert!(matches!(
            parse_segment("[foo-bar]", "f"),
            Err(RouteValidationError::InvalidParamName { .. })
        ));
        assert!(matches!(
            parse_segment("[a(b)]", "f"),
            Err(RouteValidationError::InvalidParamName { .. })
        ));
    }

    #[test]
    fn test_rejects_leading_digit_name() {
        assert!(matches!(
            parse_segment("[1bad]", "f"),
            Err(RouteValidationError::InvalidParamName { .. })
        ));
        assert_eq!(parts("[page1]"), vec![Part::Param("page1".into())]);
    }

    #[test]
    fn test_rejects_unbalanced_brackets() {
        assert!(matches!(
            parse_segment("[id", "f"),
            Err(RouteValidationError::UnbalancedBrackets { .. })
        ));
        assert!(matches!(
            parse_segment("id]]", "f"),
            Err(RouteValidationError::UnbalancedBrackets { .. })
        ));
    }

    #[test]
    fn test_rejects_legacy_dollar_prefix() {
        assert!(matches!(
            parse_segment("$posts", "f"),
            Err(RouteValidationError::LegacySyntax { .. })
        ));
    }
}
