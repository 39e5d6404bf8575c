//! Single-flight cache of resolved static paths
//!
//! Every dynamic route moves through `Unresolved -> Resolving -> Resolved |
//! Failed`, keyed by its component path. The first caller spawns the
//! resolution and publishes the outcome on a `watch` channel; everyone else
//! subscribes to that channel, so a route's `getStaticPaths` runs at most once
//! per cache entry.
//!
//! The map lock is only held to look up or insert an entry, never while user
//! code runs.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::AbortHandle;

use pagemill_router::RouteData;

use crate::error::StaticPathsError;
use crate::module::{GetStaticPaths, PageModule};
use crate::resolve::{resolve_static_paths, ResolvedPaths};

/// Where a route is in its resolution
#[derive(Debug, Clone)]
pub enum ResolutionState {
    Unresolved,
    Resolving,
    Resolved(Arc<ResolvedPaths>),
    /// Terminal; the route is not retried until it is invalidated
    Failed(Arc<StaticPathsError>),
}

impl ResolutionState {
    pub fn is_resolving(&self) -> bool {
        matches!(self, Self::Resolving)
    }
}

/// Counters for the route cache
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls that started a new resolution
    pub misses: u64,
    /// Calls served by an existing entry, finished or in flight
    pub hits: u64,
}

struct CacheEntry {
    state: watch::Receiver<ResolutionState>,
    task: AbortHandle,
    /// The `getStaticPaths` that produced this entry
    callback: Arc<dyn GetStaticPaths>,
}

impl CacheEntry {
    fn produced_by(&self, callback: &Arc<dyn GetStaticPaths>) -> bool {
        // compare data pointers only; vtables may be duplicated across codegen units
        std::ptr::eq(
            Arc::as_ptr(&self.callback) as *const (),
            Arc::as_ptr(callback) as *const (),
        )
    }
}

/// Resolved path sets by component path
///
/// Cheap to clone; clones share the same entries.
#[derive(Clone, Default)]
pub struct RouteCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    stats: Arc<RwLock<CacheStats>>,
}

impl RouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Static paths of `route`, resolving them on first use
    ///
    /// Fully static routes have exactly one path with empty params and never
    /// touch the cache. A dynamic route whose module has no `getStaticPaths`
    /// fails straight away without creating an entry. An entry made by a
    /// different `getStaticPaths` (the module was reloaded) is replaced, so a
    /// caller still holding the old module cannot leave its paths behind for
    /// callers with the new one.
    pub async fn resolve(
        &self,
        route: &Arc<RouteData>,
        module: &PageModule,
    ) -> Result<Arc<ResolvedPaths>, Arc<StaticPathsError>> {
        if route.is_static() {
            return Ok(Arc::new(ResolvedPaths::single_static()));
        }

        let component = route.component.as_str();

        let Some(callback) = module.get_static_paths.clone() else {
            return Err(Arc::new(StaticPathsError::MissingStaticPaths {
                component: component.to_string(),
            }));
        };

        let existing = self
            .entries
            .read()
            .await
            .get(component)
            .filter(|entry| entry.produced_by(&callback))
            .map(|entry| entry.state.clone());
        if let Some(state) = existing {
            self.record_hit().await;
            return wait_for_outcome(component, state).await;
        }

        let (state, started) = {
            let mut entries = self.entries.write().await;
            // another caller may have started it between the two locks
            let current = entries
                .get(component)
                .filter(|entry| entry.produced_by(&callback))
                .map(|entry| entry.state.clone());
            match current {
                Some(state) => (state, false),
                None => {
                    if entries.contains_key(component) {
                        tracing::debug!("module for {} was reloaded; dropping its paths", component);
                    }
                    let (tx, rx) = watch::channel(ResolutionState::Resolving);
                    let task = tokio::spawn(run_resolution(route.clone(), callback.clone(), tx));
                    entries.insert(
                        component.to_string(),
                        CacheEntry {
                            state: rx.clone(),
                            task: task.abort_handle(),
                            callback,
                        },
                    );
                    (rx, true)
                }
            }
        };

        if started {
            tracing::debug!("resolving static paths for {}", component);
            self.stats.write().await.misses += 1;
        } else {
            self.record_hit().await;
        }

        wait_for_outcome(component, state).await
    }

    /// Current state of a component's entry
    pub async fn state(&self, component: &str) -> ResolutionState {
        let entries = self.entries.read().await;
        let Some(entry) = entries.get(component) else {
            return ResolutionState::Unresolved;
        };

        let state = entry.state.borrow().clone();
        // resolving with the sender gone means the task was cancelled
        if state.is_resolving() && entry.state.has_changed().is_err() {
            return ResolutionState::Failed(Arc::new(StaticPathsError::Aborted {
                component: component.to_string(),
            }));
        }
        state
    }

    /// Cancels every resolution still running
    ///
    /// Returns once the cancelled tasks have stopped. Their waiters, and any
    /// later caller for the same route, get [`StaticPathsError::Aborted`].
    pub async fn abort_in_flight(&self) -> usize {
        let aborted: Vec<watch::Receiver<ResolutionState>> = {
            let entries = self.entries.read().await;
            entries
                .iter()
                .filter(|(_, entry)| entry.state.borrow().is_resolving())
                .map(|(component, entry)| {
                    tracing::debug!("aborting static path resolution for {}", component);
                    entry.task.abort();
                    entry.state.clone()
                })
                .collect()
        };

        let count = aborted.len();
        for mut state in aborted {
            // completes once the task has either published or been dropped
            let _ = state.wait_for(|state| !state.is_resolving()).await;
        }

        if count > 0 {
            tracing::warn!("aborted {} in-flight static path resolutions", count);
        }
        count
    }

    /// Drops the entry for `component` so the next call resolves again
    ///
    /// A resolution already in flight keeps running and its current waiters
    /// still receive its outcome.
    pub async fn invalidate(&self, component: &str) -> bool {
        let removed = self.entries.write().await.remove(component).is_some();
        if removed {
            tracing::debug!("invalidated static paths for {}", component);
        }
        removed
    }

    /// Drops every entry
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        tracing::debug!("clearing {} route cache entries", entries.len());
        entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    async fn record_hit(&self) {
        self.stats.write().await.hits += 1;
    }
}

async fn run_resolution(
    route: Arc<RouteData>,
    callback: Arc<dyn GetStaticPaths>,
    tx: watch::Sender<ResolutionState>,
) {
    let component = route.component.clone();

    let state = match resolve_static_paths(route, callback.as_ref()).await {
        Ok(paths) => {
            tracing::debug!("resolved {} static paths for {}", paths.len(), component);
            ResolutionState::Resolved(Arc::new(paths))
        }
        Err(err) => {
            tracing::warn!("{}", err);
            ResolutionState::Failed(Arc::new(err))
        }
    };

    tx.send_replace(state);
}

async fn wait_for_outcome(
    component: &str,
    mut state: watch::Receiver<ResolutionState>,
) -> Result<Arc<ResolvedPaths>, Arc<StaticPathsError>> {
    let outcome = state
        .wait_for(|state| !state.is_resolving())
        .await
        .map(|state| state.clone());

    match outcome {
        Ok(ResolutionState::Resolved(paths)) => Ok(paths),
        Ok(ResolutionState::Failed(err)) => Err(err),
        // the sender only goes away without publishing when the task is aborted
        _ => Err(Arc::new(StaticPathsError::Aborted {
            component: component.to_string(),
        })),
    }
}
