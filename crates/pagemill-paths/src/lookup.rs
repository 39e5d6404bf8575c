//! Request-time params and props lookup

use serde_json::Value;
use std::sync::Arc;

use pagemill_router::{ManifestData, Params, RouteData};

use crate::cache::RouteCache;
use crate::error::StaticPathsError;
use crate::module::ModuleRegistry;

/// The route, params and props to render a request with
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub route: Arc<RouteData>,
    pub params: Params,
    pub props: Option<Value>,
}

/// Finds what to render for `pathname`
///
/// `Ok(None)` means no route matched. A dynamic route that matched but whose
/// resolved paths don't include the decoded params is an error.
pub async fn get_params_and_props(
    manifest: &ManifestData,
    cache: &RouteCache,
    modules: &ModuleRegistry,
    pathname: &str,
) -> Result<Option<PageRequest>, Arc<StaticPathsError>> {
    let Some(found) = manifest.find(pathname) else {
        tracing::debug!("no route matches {}", pathname);
        return Ok(None);
    };

    if found.route.is_static() {
        return Ok(Some(PageRequest {
            route: found.route,
            params: found.params,
            props: None,
        }));
    }

    let module = modules.get(&found.route.component);
    let resolved = cache.resolve(&found.route, &module).await?;

    let Some(static_path) = resolved.find(&found.params) else {
        return Err(Arc::new(StaticPathsError::NoMatchingStaticPath {
            component: found.route.component.clone(),
            pathname: pathname.to_string(),
        }));
    };

    Ok(Some(PageRequest {
        props: static_path.props.clone(),
        route: found.route,
        params: found.params,
    }))
}
