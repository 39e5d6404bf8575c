//! Running `getStaticPaths` and validating what it returns

use futures::FutureExt;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use pagemill_router::{Params, RouteData};

use crate::error::{ParamWarningKind, StaticPathsError, StaticPathsParamWarning};
use crate::helpers::StaticPathsHelpers;
use crate::module::GetStaticPaths;

/// One concrete path of a dynamic route
#[derive(Debug, Clone, PartialEq)]
pub struct StaticPath {
    pub params: Params,
    pub props: Option<Value>,
}

/// Everything `getStaticPaths` produced for one route
#[derive(Debug, Clone, Default)]
pub struct ResolvedPaths {
    /// Paths in the order the callback returned them
    static_paths: Vec<StaticPath>,
    pub warnings: Vec<StaticPathsParamWarning>,
    /// Feed requested through the `rss` helper
    pub rss: Option<Value>,
    /// `params_key` -> index into `static_paths`; first path wins
    keyed: HashMap<String, usize>,
}

impl ResolvedPaths {
    pub fn new(
        static_paths: Vec<StaticPath>,
        warnings: Vec<StaticPathsParamWarning>,
        rss: Option<Value>,
    ) -> Self {
        let mut keyed = HashMap::with_capacity(static_paths.len());
        for (index, path) in static_paths.iter().enumerate() {
            keyed.entry(params_key(&path.params)).or_insert(index);
        }

        Self {
            static_paths,
            warnings,
            rss,
            keyed,
        }
    }

    /// The single empty-params path of a fully static route
    pub fn single_static() -> Self {
        Self::new(
            vec![StaticPath {
                params: Params::new(),
                props: None,
            }],
            Vec::new(),
            None,
        )
    }

    /// Paths in the order the callback returned them
    pub fn static_paths(&self) -> &[StaticPath] {
        &self.static_paths
    }

    /// Looks up the path whose params serialize like `params`
    pub fn find(&self, params: &Params) -> Option<&StaticPath> {
        self.keyed
            .get(&params_key(params))
            .map(|&index| &self.static_paths[index])
    }

    pub fn len(&self) -> usize {
        self.static_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.static_paths.is_empty()
    }
}

/// Canonical lookup key for a params map
///
/// Absent and empty values are left out, so a rest param that matched nothing
/// at request time finds the path that declared it as `undefined`.
///
/// # Examples
///
/// ```
/// use pagemill_paths::params_key;
/// use pagemill_router::Params;
///
/// let params = Params::from([
///     ("slug".to_string(), Some("hello".to_string())),
///     ("rest".to_string(), None),
/// ]);
/// assert_eq!(params_key(&params), r#"{"slug":"hello"}"#);
/// ```
pub fn params_key(params: &Params) -> String {
    let defined: BTreeMap<&str, &str> = params
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| (key.as_str(), v))
        })
        .collect();

    serde_json::to_string(&defined).unwrap_or_default()
}

/// Calls the route's `getStaticPaths` and validates the result
///
/// A panic inside the callback is reported as a callback failure.
pub async fn resolve_static_paths(
    route: Arc<RouteData>,
    callback: &dyn GetStaticPaths,
) -> Result<ResolvedPaths, StaticPathsError> {
    let component = route.component.clone();
    let helpers = StaticPathsHelpers::new(route);
    let rss = helpers.rss.clone();

    let outcome = AssertUnwindSafe(callback.get_static_paths(helpers))
        .catch_unwind()
        .await;

    let value = match outcome {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            return Err(StaticPathsError::Callback {
                component,
                message: format!("{err:#}"),
            })
        }
        Err(_) => {
            return Err(StaticPathsError::Callback {
                component,
                message: "getStaticPaths() panicked".to_string(),
            })
        }
    };

    let (static_paths, warnings) = validate_static_paths(&component, value)?;
    Ok(ResolvedPaths::new(static_paths, warnings, rss.request()))
}

/// Checks the shape of a `getStaticPaths` result
///
/// Non-string param values and empty strings are only warned about; the
/// best-effort string value is kept.
pub fn validate_static_paths(
    component: &str,
    value: Value,
) -> Result<(Vec<StaticPath>, Vec<StaticPathsParamWarning>), StaticPathsError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(StaticPathsError::StaticPathsShape {
                component: component.to_string(),
                found: other.to_string(),
            })
        }
    };

    let flattened = items.into_iter().flat_map(|item| match item {
        Value::Array(inner) => inner,
        other => vec![other],
    });

    let mut static_paths = Vec::new();
    let mut warnings = Vec::new();

    for (index, item) in flattened.enumerate() {
        let invalid = |reason: String| StaticPathsError::InvalidPathObject {
            component: component.to_string(),
            index,
            reason,
        };

        let mut object = match item {
            Value::Object(object) => object,
            other => return Err(invalid(format!("expected an object, but got `{other}`"))),
        };

        let params = match object.remove("params") {
            Some(Value::Object(params)) => params,
            Some(other) => {
                return Err(invalid(format!(
                    "expected `params` to be an object, but got `{other}`"
                )))
            }
            None => return Err(invalid("missing `params`".to_string())),
        };

        let params = params
            .into_iter()
            .map(|(key, value)| {
                let (value, warning) = param_value(value);
                if let Some(kind) = warning {
                    let warning = StaticPathsParamWarning {
                        component: component.to_string(),
                        key: key.clone(),
                        kind,
                    };
                    tracing::warn!("[getStaticPaths] {}", warning);
                    warnings.push(warning);
                }
                (key, value)
            })
            .collect();

        let props = object.remove("props").filter(|props| !props.is_null());
        static_paths.push(StaticPath { params, props });
    }

    tracing::debug!(
        "{} returned {} static paths ({} warnings)",
        component,
        static_paths.len(),
        warnings.len()
    );

    Ok((static_paths, warnings))
}

fn param_value(value: Value) -> (Option<String>, Option<ParamWarningKind>) {
    match value {
        Value::Null => (None, None),
        Value::String(s) if s.is_empty() => (Some(s), Some(ParamWarningKind::EmptyString)),
        Value::String(s) => (Some(s), None),
        other => {
            let found = other.to_string();
            (
                Some(found.clone()),
                Some(ParamWarningKind::NotAString { found }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const COMPONENT: &str = "src/pages/[slug].astro";

    fn params(pairs: &[(&str, Option<&str>)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_valid_result() {
        let (paths, warnings) = validate_static_paths(
            COMPONENT,
            json!([
                { "params": { "slug": "a" }, "props": { "title": "A" } },
                { "params": { "slug": "b" } },
            ]),
        )
        .unwrap();

        assert!(warnings.is_empty());
        assert_eq!(
            paths,
            vec![
                StaticPath {
                    params: params(&[("slug", Some("a"))]),
                    props: Some(json!({ "title": "A" })),
                },
                StaticPath {
                    params: params(&[("slug", Some("b"))]),
                    props: None,
                },
            ]
        );
    }

    #[test]
    fn test_nested_arrays_flatten_one_level() {
        let (paths, _) = validate_static_paths(
            COMPONENT,
            json!([[{ "params": { "slug": "a" } }, { "params": { "slug": "b" } }], { "params": { "slug": "c" } }]),
        )
        .unwrap();
        assert_eq!(paths.len(), 3);

        let err = validate_static_paths(COMPONENT, json!([[[{ "params": {} }]]])).unwrap_err();
        assert!(matches!(err, StaticPathsError::InvalidPathObject { index: 0, .. }));
    }

    #[test]
    fn test_non_array_is_shape_error() {
        let err = validate_static_paths(COMPONENT, json!({ "params": {} })).unwrap_err();
        assert_eq!(
            err,
            StaticPathsError::StaticPathsShape {
                component: COMPONENT.into(),
                found: r#"{"params":{}}"#.into(),
            }
        );
    }

    #[test]
    fn test_params_must_be_an_object() {
        let err = validate_static_paths(
            COMPONENT,
            json!([{ "params": { "slug": "ok" } }, { "params": "slug" }]),
        )
        .unwrap_err();
        assert!(matches!(err, StaticPathsError::InvalidPathObject { index: 1, .. }));

        let err = validate_static_paths(COMPONENT, json!([{ "props": {} }])).unwrap_err();
        assert!(err.to_string().contains("missing `params`"));
    }

    #[test]
    fn test_param_values_warn_but_continue() {
        let (paths, warnings) = validate_static_paths(
            COMPONENT,
            json!([{ "params": { "id": 1, "slug": "", "rest": null } }]),
        )
        .unwrap();

        assert_eq!(
            paths[0].params,
            params(&[("id", Some("1")), ("slug", Some("")), ("rest", None)])
        );
        assert_eq!(
            warnings,
            vec![
                StaticPathsParamWarning {
                    component: COMPONENT.into(),
                    key: "id".into(),
                    kind: ParamWarningKind::NotAString { found: "1".into() },
                },
                StaticPathsParamWarning {
                    component: COMPONENT.into(),
                    key: "slug".into(),
                    kind: ParamWarningKind::EmptyString,
                },
            ]
        );
    }

    #[test]
    fn test_keyed_lookup_ignores_absent_values() {
        let resolved = ResolvedPaths::new(
            vec![
                StaticPath { params: params(&[("page", None)]), props: Some(json!(1)) },
                StaticPath { params: params(&[("page", Some("2"))]), props: Some(json!(2)) },
                StaticPath { params: params(&[("page", Some("2"))]), props: Some(json!(3)) },
            ],
            Vec::new(),
            None,
        );

        assert_eq!(resolved.find(&Params::new()).unwrap().props, Some(json!(1)));
        assert_eq!(
            resolved.find(&params(&[("page", Some("2"))])).unwrap().props,
            Some(json!(2))
        );
        assert!(resolved.find(&params(&[("page", Some("4"))])).is_none());
    }

    #[test]
    fn test_find_points_into_static_paths() {
        let resolved = ResolvedPaths::new(
            vec![
                StaticPath { params: params(&[("slug", Some("a"))]), props: None },
                StaticPath { params: params(&[("slug", Some("b"))]), props: Some(json!("b")) },
            ],
            Vec::new(),
            None,
        );

        let found = resolved.find(&params(&[("slug", Some("b"))])).unwrap();
        assert!(std::ptr::eq(found, &resolved.static_paths()[1]));
        assert_eq!(resolved.static_paths().len(), resolved.len());
    }

    #[test]
    fn test_single_static_path() {
        let resolved = ResolvedPaths::single_static();
        assert_eq!(resolved.len(), 1);
        assert!(resolved.find(&Params::new()).is_some());
    }
}
