//! Build and dev sessions
//!
//! A [`Session`] owns the manifest, the route cache and the loaded page
//! modules for one build or one dev server run. Nothing is shared between
//! sessions.

use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;

use pagemill_router::{Config, ManifestData, ManifestError, PageSource};

use crate::cache::RouteCache;
use crate::error::{BuildError, StaticPathsError};
use crate::lookup::{get_params_and_props, PageRequest};
use crate::module::{ModuleRegistry, PageModule};
use crate::plan::{plan_prerender, PrerenderPlan};

pub struct Session<S> {
    config: Config,
    source: S,
    manifest: RwLock<Arc<ManifestData>>,
    cache: RouteCache,
    modules: RwLock<ModuleRegistry>,
}

impl<S: PageSource> Session<S> {
    /// Starts a session by compiling the manifest from `source`
    pub fn new(config: Config, source: S, modules: ModuleRegistry) -> Result<Self, ManifestError> {
        let manifest = config.routing.manifest_builder(&source).build()?;
        tracing::info!(
            "session started with {} routes from {}",
            manifest.len(),
            config.routing.pages_dir
        );

        Ok(Self {
            config,
            source,
            manifest: RwLock::new(Arc::new(manifest)),
            cache: RouteCache::new(),
            modules: RwLock::new(modules),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the current manifest
    pub async fn manifest(&self) -> Arc<ManifestData> {
        self.manifest.read().await.clone()
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    /// Registers a (re)loaded module and forgets its resolved paths
    ///
    /// Lookups already running with the previous module finish with its
    /// paths; the cache replaces whatever they leave behind on the next call.
    pub async fn set_module(&self, component: impl Into<String>, module: PageModule) {
        let component = component.into();
        let mut modules = self.modules.write().await;
        modules.insert(component.clone(), module);
        self.cache.invalidate(&component).await;
    }

    /// Every path a build emits
    ///
    /// Conflicts fail the build when `build.strict_route_conflicts` is set.
    pub async fn prerender(&self) -> Result<PrerenderPlan, BuildError> {
        let manifest = self.manifest().await;
        let modules = self.modules.read().await.clone();
        plan_prerender(
            &manifest,
            &self.cache,
            &modules,
            self.config.build.strict_route_conflicts,
        )
        .await
    }

    /// What to render for a request to `pathname`
    pub async fn lookup(&self, pathname: &str) -> Result<Option<PageRequest>, Arc<StaticPathsError>> {
        let manifest = self.manifest().await;
        let modules = self.modules.read().await.clone();
        get_params_and_props(&manifest, &self.cache, &modules, pathname).await
    }

    /// Reacts to a change of the page file at `component`
    ///
    /// The component's cached paths are dropped and the manifest is rebuilt,
    /// so added and removed pages are picked up. If the rebuild fails the
    /// previous manifest stays in place.
    pub async fn on_file_change(&self, component: impl AsRef<Path>) -> Result<(), ManifestError> {
        let component = component.as_ref().to_string_lossy().replace('\\', "/");
        self.cache.invalidate(&component).await;

        let manifest = self.config.routing.manifest_builder(&self.source).build()?;
        tracing::debug!(
            "rebuilt manifest after change to {} ({} routes)",
            component,
            manifest.len()
        );
        *self.manifest.write().await = Arc::new(manifest);
        Ok(())
    }

    /// Cancels outstanding resolutions; returns how many were running
    pub async fn shutdown(&self) -> usize {
        let aborted = self.cache.abort_in_flight().await;
        tracing::info!("session shut down ({} resolutions aborted)", aborted);
        aborted
    }
}
