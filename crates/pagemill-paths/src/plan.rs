//! Prerender planning
//!
//! Resolves every route of a manifest in parallel, expands each into the
//! concrete pathnames it builds, and settles pathnames claimed by more than
//! one route in favour of the route that comes first in the manifest.

use futures::future::join_all;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use pagemill_router::{ManifestData, Params, RouteData};

use crate::cache::RouteCache;
use crate::error::{BuildError, PrerenderRouteConflict};
use crate::module::ModuleRegistry;

/// One page or endpoint output to build
#[derive(Debug, Clone)]
pub struct PrerenderPath {
    pub pathname: String,
    pub route: Arc<RouteData>,
    pub params: Params,
    pub props: Option<Value>,
}

/// Everything a build will emit, in manifest order
#[derive(Debug, Clone, Default)]
pub struct PrerenderPlan {
    pub paths: Vec<PrerenderPath>,
    /// Pathnames dropped from lower-priority routes
    pub conflicts: Vec<PrerenderRouteConflict>,
}

impl PrerenderPlan {
    pub fn pathnames(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(|path| path.pathname.as_str())
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Builds the prerender plan for `manifest`
///
/// With `strict` set the first conflicting pathname fails the build; the
/// error is the same on every run because routes are walked in manifest
/// order. Otherwise conflicts are logged and the losing output is dropped.
pub async fn plan_prerender(
    manifest: &ManifestData,
    cache: &RouteCache,
    modules: &ModuleRegistry,
    strict: bool,
) -> Result<PrerenderPlan, BuildError> {
    let resolutions = join_all(manifest.routes.iter().map(|route| {
        let module = modules.get(&route.component);
        async move { cache.resolve(route, &module).await }
    }))
    .await;

    let mut plan = PrerenderPlan::default();
    let mut claimed: HashMap<String, Arc<RouteData>> = HashMap::new();

    for (route, resolved) in manifest.routes.iter().zip(resolutions) {
        let resolved = resolved?;

        for static_path in resolved.static_paths() {
            let pathname =
                route
                    .generate(&static_path.params)
                    .map_err(|source| BuildError::Generate {
                        component: route.component.clone(),
                        source,
                    })?;

            if let Some(winner) = claimed.get(&pathname) {
                if Arc::ptr_eq(winner, route) {
                    tracing::debug!("{} lists {} more than once", route.component, pathname);
                    continue;
                }

                let conflict = PrerenderRouteConflict {
                    pathname,
                    winner: winner.component.clone(),
                    loser: route.component.clone(),
                };
                if strict {
                    return Err(conflict.into());
                }
                tracing::warn!("route conflict: {}", conflict);
                plan.conflicts.push(conflict);
                continue;
            }

            claimed.insert(pathname.clone(), route.clone());
            plan.paths.push(PrerenderPath {
                pathname,
                route: route.clone(),
                params: static_path.params.clone(),
                props: static_path.props.clone(),
            });
        }
    }

    tracing::info!(
        "planned {} paths from {} routes ({} conflicts)",
        plan.paths.len(),
        manifest.len(),
        plan.conflicts.len()
    );

    Ok(plan)
}
