//! Page modules and their `getStaticPaths` export

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::helpers::StaticPathsHelpers;

/// The path-enumeration export of a dynamic page
///
/// Returns a JSON array of `{ params, props? }` objects. Nested arrays are
/// flattened one level, so `paginate()` output can be returned as-is inside a
/// larger list.
///
/// Implemented for async closures:
///
/// ```
/// use pagemill_paths::{PageModule, StaticPathsHelpers};
/// use serde_json::json;
///
/// let module = PageModule::with_static_paths(|_helpers: StaticPathsHelpers| async {
///     Ok::<_, anyhow::Error>(json!([{ "params": { "slug": "hello" } }]))
/// });
/// assert!(module.get_static_paths.is_some());
/// ```
#[async_trait]
pub trait GetStaticPaths: Send + Sync {
    async fn get_static_paths(&self, helpers: StaticPathsHelpers) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> GetStaticPaths for F
where
    F: Fn(StaticPathsHelpers) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send,
{
    async fn get_static_paths(&self, helpers: StaticPathsHelpers) -> anyhow::Result<Value> {
        (self)(helpers).await
    }
}

/// What the resolver needs from a loaded page module
#[derive(Clone, Default)]
pub struct PageModule {
    pub get_static_paths: Option<Arc<dyn GetStaticPaths>>,
}

impl PageModule {
    /// A module without a `getStaticPaths` export
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_static_paths<G>(get_static_paths: G) -> Self
    where
        G: GetStaticPaths + 'static,
    {
        Self {
            get_static_paths: Some(Arc::new(get_static_paths)),
        }
    }
}

impl fmt::Debug for PageModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageModule")
            .field("get_static_paths", &self.get_static_paths.is_some())
            .finish()
    }
}

/// Loaded page modules by component path
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: HashMap<String, PageModule>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ModuleRegistry::insert`]
    pub fn with_module(mut self, component: impl Into<String>, module: PageModule) -> Self {
        self.insert(component, module);
        self
    }

    /// Registers (or replaces) the module for `component`
    pub fn insert(&mut self, component: impl Into<String>, module: PageModule) {
        self.modules.insert(component.into(), module);
    }

    pub fn remove(&mut self, component: &str) -> Option<PageModule> {
        self.modules.remove(component)
    }

    /// The module for `component`; unknown components have no exports
    pub fn get(&self, component: &str) -> PageModule {
        self.modules.get(component).cloned().unwrap_or_default()
    }

    pub fn contains(&self, component: &str) -> bool {
        self.modules.contains_key(component)
    }
}
