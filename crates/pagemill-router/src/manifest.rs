//! Route manifest builder
//!
//! Walks the pages directory depth-first, visiting siblings in priority order,
//! and compiles every page or endpoint file into a [`RouteData`]. The order of
//! `ManifestData::routes` is the match order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::ManifestError;
use crate::item::{read_items, Item};
use crate::route::{RouteData, RouteKind, RouteMatch, TrailingSlash};
use crate::segment::Part;
use crate::source::{FsPageSource, PageSource};

/// The compiled routing table
#[derive(Debug, Clone, Default)]
pub struct ManifestData {
    /// Routes in match priority order
    pub routes: Vec<Arc<RouteData>>,
}

impl ManifestData {
    /// First route matching `pathname`, with its decoded params
    pub fn find(&self, pathname: &str) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| {
            route.params_for(pathname).map(|params| RouteMatch {
                route: Arc::clone(route),
                params,
            })
        })
    }

    /// Route compiled from `component`, if any
    pub fn route_for_component(&self, component: &str) -> Option<&Arc<RouteData>> {
        self.routes.iter().find(|route| route.component == component)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// First route in manifest order whose pattern matches `pathname`
///
/// # Examples
///
/// ```
/// use pagemill_router::manifest::{match_route, ManifestBuilder};
/// use pagemill_router::source::MemoryPageSource;
///
/// let source = MemoryPageSource::from_files([
///     "src/pages/about.astro",
///     "src/pages/[slug].astro",
/// ]);
/// let manifest = ManifestBuilder::new(&source, "src/pages").build().unwrap();
///
/// assert_eq!(match_route("/about", &manifest).unwrap().component, "src/pages/about.astro");
/// assert_eq!(match_route("/other", &manifest).unwrap().component, "src/pages/[slug].astro");
/// assert!(match_route("/a/b", &manifest).is_none());
/// ```
pub fn match_route<'a>(pathname: &str, manifest: &'a ManifestData) -> Option<&'a Arc<RouteData>> {
    manifest.routes.iter().find(|route| route.matches(pathname))
}

/// Builds the manifest for `pages_dir` on the local filesystem
///
/// Component paths keep the `pages_dir` prefix as given, so a relative
/// `pages_dir` yields paths relative to the working directory.
pub fn build_manifest(
    pages_dir: impl AsRef<Path>,
    trailing_slash: TrailingSlash,
) -> Result<ManifestData, ManifestError> {
    ManifestBuilder::new(FsPageSource, pages_dir.as_ref())
        .trailing_slash(trailing_slash)
        .build()
}

// ============================================================================
// Builder
// ============================================================================

/// Configures and runs one manifest walk
pub struct ManifestBuilder<S> {
    source: S,
    pages_dir: PathBuf,
    root: Option<PathBuf>,
    trailing_slash: TrailingSlash,
    endpoint_extensions: Vec<String>,
}

impl<S: PageSource> ManifestBuilder<S> {
    pub fn new(source: S, pages_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            pages_dir: pages_dir.into(),
            root: None,
            trailing_slash: TrailingSlash::default(),
            endpoint_extensions: vec!["js".to_string(), "ts".to_string()],
        }
    }

    /// Directory component paths are made relative to
    ///
    /// Unset, paths keep the `pages_dir` prefix as given.
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn trailing_slash(mut self, trailing_slash: TrailingSlash) -> Self {
        self.trailing_slash = trailing_slash;
        self
    }

    /// Extensions (without the dot) that mark a file as an endpoint
    pub fn endpoint_extensions<I, T>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.endpoint_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Runs the walk
    ///
    /// A missing pages directory is not an error: it yields an empty manifest.
    /// Any invalid filename aborts the whole walk.
    pub fn build(self) -> Result<ManifestData, ManifestError> {
        if !self.source.exists(&self.pages_dir) {
            tracing::warn!(
                "pages directory {} does not exist, no routes will be built",
                self.pages_dir.display()
            );
            return Ok(ManifestData::default());
        }

        let root = self.root.clone().unwrap_or_default();

        let mut routes = Vec::new();
        self.walk(&self.pages_dir, &root, &[], &[], &mut routes)?;

        tracing::debug!(
            "built manifest with {} routes from {}",
            routes.len(),
            self.pages_dir.display()
        );

        let manifest = ManifestData { routes };
        detect_route_collisions(&manifest);
        Ok(manifest)
    }

    fn walk(
        &self,
        dir: &Path,
        root: &Path,
        parent_segments: &[Vec<Part>],
        parent_params: &[String],
        routes: &mut Vec<Arc<RouteData>>,
    ) -> Result<(), ManifestError> {
        let items = read_items(&self.source, dir, root, &self.endpoint_extensions)?;

        for item in items {
            let segments = item_segments(&item, parent_segments);

            let mut params = parent_params.to_vec();
            params.extend(
                item.parts
                    .iter()
                    .filter(|part| part.is_dynamic())
                    .map(|part| part.content().to_string()),
            );

            if item.is_dir {
                self.walk(&dir.join(&item.basename), root, &segments, &params, routes)?;
                continue;
            }

            let kind = if item.is_page {
                RouteKind::Page
            } else {
                RouteKind::Endpoint
            };
            let route = RouteData::new(
                item.file,
                kind,
                segments,
                params,
                self.trailing_slash,
                item.is_index,
            );
            tracing::debug!("route {}", route);
            routes.push(Arc::new(route));
        }

        Ok(())
    }
}

/// Segments for an item, given its parent's
///
/// An index file without a suffix is its parent's route. With a suffix
/// (`index.xml.ts`) the suffix is attached to the parent's last segment: as a
/// new static part after a dynamic part, or glued onto a static part.
fn item_segments(item: &Item, parent_segments: &[Vec<Part>]) -> Vec<Vec<Part>> {
    let mut segments = parent_segments.to_vec();

    if !item.is_index {
        segments.push(item.parts.clone());
        return segments;
    }
    if item.route_suffix.is_empty() {
        return segments;
    }

    match segments.last_mut() {
        Some(last_segment) => match last_segment.last_mut() {
            Some(Part::Static(text)) => text.push_str(&item.route_suffix),
            _ => last_segment.push(Part::Static(item.route_suffix.clone())),
        },
        None => segments.push(item.parts.clone()),
    }

    segments
}

/// Logs every fully static route that is shadowed by an earlier one
///
/// Returns the `(winner, shadowed)` component pairs.
pub fn detect_route_collisions(manifest: &ManifestData) -> Vec<(String, String)> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    let mut collisions = Vec::new();

    for route in &manifest.routes {
        let Some(pathname) = route.pathname.as_deref() else {
            continue;
        };

        match seen.get(pathname) {
            Some(&winner) => {
                tracing::warn!(
                    "route {} from {} is shadowed by {} and will never match",
                    pathname,
                    route.component,
                    winner
                );
                collisions.push((winner.to_string(), route.component.clone()));
            }
            None => {
                seen.insert(pathname, &route.component);
            }
        }
    }

    collisions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryPageSource;
    use pretty_assertions::assert_eq;

    fn build(files: &[&str]) -> ManifestData {
        let source = MemoryPageSource::from_files(files.iter().copied());
        ManifestBuilder::new(&source, "src/pages").build().unwrap()
    }

    fn components(manifest: &ManifestData) -> Vec<&str> {
        manifest.routes.iter().map(|r| r.component.as_str()).collect()
    }

    #[test]
    fn test_missing_pages_dir_is_empty() {
        let source = MemoryPageSource::new().with_file("src/other/file.astro");
        let manifest = ManifestBuilder::new(&source, "src/pages").build().unwrap();
        assert!(manifest.is_empty());
    }

    #[test]
    fn test_index_takes_parent_route() {
        let manifest = build(&["src/pages/index.astro", "src/pages/blog/index.astro"]);
        let routes: Vec<&str> = manifest.routes.iter().map(|r| r.route.as_str()).collect();
        assert_eq!(routes, vec!["/", "/blog"]);
        assert!(manifest.routes.iter().all(|r| r.is_index));
    }

    #[test]
    fn test_params_accumulate_through_directories() {
        let manifest = build(&["src/pages/[lang]/docs/[...path].astro"]);
        let route = &manifest.routes[0];
        assert_eq!(route.params, vec!["lang", "path"]);
        assert_eq!(route.route, "/[lang]/docs/[...path]");
    }

    #[test]
    fn test_endpoint_kind() {
        let manifest = build(&["src/pages/feed.json.ts", "src/pages/about.astro"]);
        let feed = manifest.route_for_component("src/pages/feed.json.ts").unwrap();
        assert_eq!(feed.kind, RouteKind::Endpoint);
        assert_eq!(feed.pathname.as_deref(), Some("/feed.json"));
        let about = manifest.route_for_component("src/pages/about.astro").unwrap();
        assert_eq!(about.kind, RouteKind::Page);
    }

    #[test]
    fn test_index_suffix_after_static_is_glued() {
        let manifest = build(&["src/pages/blog/index.xml.ts"]);
        let route = &manifest.routes[0];
        assert_eq!(route.segments, vec![vec![Part::Static("blog.xml".into())]]);
        assert_eq!(route.pathname.as_deref(), Some("/blog.xml"));
    }

    #[test]
    fn test_index_suffix_after_param_is_new_part() {
        let manifest = build(&["src/pages/[lang]/index.json.ts"]);
        let route = &manifest.routes[0];
        assert_eq!(
            route.segments,
            vec![vec![Part::Param("lang".into()), Part::Static(".json".into())]]
        );
        assert!(route.matches("/en.json"));
    }

    #[test]
    fn test_root_index_suffix_is_own_segment() {
        let manifest = build(&["src/pages/index.xml.ts"]);
        assert_eq!(manifest.routes[0].pathname.as_deref(), Some("/index.xml"));
    }

    #[test]
    fn test_invalid_nested_file_aborts_build() {
        let source = MemoryPageSource::from_files([
            "src/pages/index.astro",
            "src/pages/blog/[...a]b.astro",
        ]);
        let err = ManifestBuilder::new(&source, "src/pages").build().unwrap_err();
        assert!(err.to_string().contains("rest parameter must be a standalone segment"));
    }

    #[test]
    fn test_find_returns_decoded_params() {
        let manifest = build(&["src/pages/blog/[slug].astro"]);
        let found = manifest.find("/blog/caf%C3%A9").unwrap();
        assert_eq!(found.route.component, "src/pages/blog/[slug].astro");
        assert_eq!(found.params.get("slug"), Some(&Some("café".to_string())));
    }

    #[test]
    fn test_collisions_are_reported() {
        // the directory sorts first on the file-path fallback
        let manifest = build(&["src/pages/about.astro", "src/pages/about/index.astro"]);
        assert_eq!(
            components(&manifest),
            vec!["src/pages/about/index.astro", "src/pages/about.astro"]
        );
        let collisions = detect_route_collisions(&manifest);
        assert_eq!(
            collisions,
            vec![(
                "src/pages/about/index.astro".to_string(),
                "src/pages/about.astro".to_string()
            )]
        );
    }

    #[test]
    fn test_custom_root() {
        let source = MemoryPageSource::from_files(["site/src/pages/about.astro"]);
        let manifest = ManifestBuilder::new(&source, "site/src/pages")
            .root("site")
            .build()
            .unwrap();
        assert_eq!(components(&manifest), vec!["src/pages/about.astro"]);
    }
}
