//! Errors and warnings raised while resolving static paths

use pagemill_router::{GenerateError, ManifestError};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Fatal failure resolving the static paths of one route
///
/// Shared as `Arc<StaticPathsError>` because every caller waiting on the same
/// resolution receives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StaticPathsError {
    #[error("[getStaticPaths] {component} is a dynamic route but does not export getStaticPaths()")]
    MissingStaticPaths { component: String },

    #[error("[getStaticPaths] invalid return value in {component}. Expected an array of path objects, but got `{found}`")]
    StaticPathsShape { component: String, found: String },

    #[error("[getStaticPaths] invalid path object #{index} in {component}: {reason}")]
    InvalidPathObject {
        component: String,
        index: usize,
        reason: String,
    },

    #[error("[getStaticPaths] {component} failed: {message}")]
    Callback { component: String, message: String },

    #[error("[getStaticPaths] resolution of {component} was aborted")]
    Aborted { component: String },

    #[error("[getStaticPaths] route pattern matched, but no matching static path found. ({pathname})")]
    NoMatchingStaticPath { component: String, pathname: String },
}

impl StaticPathsError {
    /// The page component the error belongs to
    pub fn component(&self) -> &str {
        match self {
            Self::MissingStaticPaths { component }
            | Self::StaticPathsShape { component, .. }
            | Self::InvalidPathObject { component, .. }
            | Self::Callback { component, .. }
            | Self::Aborted { component }
            | Self::NoMatchingStaticPath { component, .. } => component,
        }
    }
}

/// What was wrong with a param value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamWarningKind {
    /// Not a string; `found` is the JSON rendering of the value
    NotAString { found: String },
    /// Empty string where an absent value was probably meant
    EmptyString,
}

/// Non-fatal problem with one param of one path object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPathsParamWarning {
    pub component: String,
    pub key: String,
    pub kind: ParamWarningKind,
}

impl fmt::Display for StaticPathsParamWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ParamWarningKind::NotAString { found } => write!(
                f,
                "invalid path param in {}: {}. A string value was expected, but got `{}`",
                self.component, self.key, found
            ),
            ParamWarningKind::EmptyString => write!(
                f,
                "invalid path param in {}: {}. `undefined` expected for an optional param, but got empty string",
                self.component, self.key
            ),
        }
    }
}

/// Two routes prerender the same pathname
///
/// `winner` comes first in manifest order and keeps the pathname.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{pathname} is produced by both {winner} and {loser}; keeping {winner}")]
pub struct PrerenderRouteConflict {
    pub pathname: String,
    pub winner: String,
    pub loser: String,
}

/// `paginate()` misuse
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginateError {
    #[error("[paginate()] page number param `page` not found in {route}. Rename your file to `[...page]` or `[page]`")]
    MissingPageParam { route: String },

    #[error("[paginate()] {0}")]
    Generate(#[from] GenerateError),
}

/// Failure producing the prerender plan
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    StaticPaths(#[from] Arc<StaticPathsError>),

    #[error("cannot build a pathname for {component}: {source}")]
    Generate {
        component: String,
        #[source]
        source: GenerateError,
    },

    #[error("route conflict: {0}")]
    Conflict(#[from] PrerenderRouteConflict),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_component() {
        let err = StaticPathsError::NoMatchingStaticPath {
            component: "src/pages/[slug].astro".into(),
            pathname: "/nope".into(),
        };
        assert_eq!(err.component(), "src/pages/[slug].astro");
        assert_eq!(
            err.to_string(),
            "[getStaticPaths] route pattern matched, but no matching static path found. (/nope)"
        );
    }

    #[test]
    fn test_warning_display() {
        let warning = StaticPathsParamWarning {
            component: "src/pages/[id].astro".into(),
            key: "id".into(),
            kind: ParamWarningKind::NotAString { found: "1".into() },
        };
        assert_eq!(
            warning.to_string(),
            "invalid path param in src/pages/[id].astro: id. A string value was expected, but got `1`"
        );
    }

    #[test]
    fn test_build_error_is_transparent_for_static_paths() {
        let err: BuildError = Arc::new(StaticPathsError::Aborted {
            component: "src/pages/[id].astro".into(),
        })
        .into();
        assert_eq!(
            err.to_string(),
            "[getStaticPaths] resolution of src/pages/[id].astro was aborted"
        );
    }
}
