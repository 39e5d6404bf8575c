//! Capability objects handed to `getStaticPaths`
//!
//! Each resolution gets its own [`StaticPathsHelpers`], bound to the route
//! being resolved. Nothing here is global, so helpers from one route can't
//! leak state into another.

use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

use pagemill_router::{Params, Part, RouteData};

use crate::error::PaginateError;

const PAGE_PARAM: &str = "page";
const DEFAULT_PAGE_SIZE: usize = 10;

/// Helpers passed to every `getStaticPaths` call
#[derive(Debug, Clone)]
pub struct StaticPathsHelpers {
    pub paginate: Paginate,
    pub rss: Rss,
}

impl StaticPathsHelpers {
    pub fn new(route: Arc<RouteData>) -> Self {
        Self {
            paginate: Paginate { route },
            rss: Rss::default(),
        }
    }
}

// ============================================================================
// paginate()
// ============================================================================

/// Options for [`Paginate::paginate`]
#[derive(Debug, Clone)]
pub struct PaginateOptions {
    /// Items per page; 0 means the default of 10
    pub page_size: usize,
    /// Extra params copied into every page
    pub params: Map<String, Value>,
    /// Extra props copied into every page
    pub props: Map<String, Value>,
}

impl Default for PaginateOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            params: Map::new(),
            props: Map::new(),
        }
    }
}

/// The `page` prop of one paginated entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub data: Vec<Value>,
    /// Index of the first item on this page
    pub start: usize,
    /// Index of the last item on this page
    pub end: usize,
    pub size: usize,
    pub total: usize,
    pub current_page: usize,
    pub last_page: usize,
    pub url: PageUrls,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageUrls {
    pub current: String,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// Splits a collection into pages for a `[page]` or `[...page]` route
#[derive(Debug, Clone)]
pub struct Paginate {
    route: Arc<RouteData>,
}

impl Paginate {
    /// One path object per page, ready to be returned from `getStaticPaths`
    ///
    /// Pages are numbered from 1. Under `[...page]` the first page has no
    /// page param, so it lives at the route's base path.
    pub fn paginate(
        &self,
        data: &[Value],
        options: PaginateOptions,
    ) -> Result<Vec<Value>, PaginateError> {
        let first_page_numbered = self.first_page_numbered()?;
        let size = if options.page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            options.page_size
        };
        let total = data.len();
        let last_page = ((total + size - 1) / size).max(1);

        let base_params = to_route_params(&options.params);
        let page_value = |num: usize| (first_page_numbered || num > 1).then(|| num.to_string());
        let url_for = |num: usize| {
            let mut params = base_params.clone();
            params.insert(PAGE_PARAM.to_string(), page_value(num));
            self.route.generate(&params)
        };

        (1..=last_page)
            .map(|num| -> Result<Value, PaginateError> {
                let start = (num - 1) * size;
                let end = (start + size).min(total);

                let page = Page {
                    data: data[start..end].to_vec(),
                    start,
                    end: end.saturating_sub(1),
                    size,
                    total,
                    current_page: num,
                    last_page,
                    url: PageUrls {
                        current: url_for(num)?,
                        next: (num < last_page).then(|| url_for(num + 1)).transpose()?,
                        prev: (num > 1).then(|| url_for(num - 1)).transpose()?,
                    },
                };

                let mut params = options.params.clone();
                params.insert(
                    PAGE_PARAM.to_string(),
                    page_value(num).map(Value::String).unwrap_or(Value::Null),
                );

                let mut props = options.props.clone();
                props.insert(
                    "page".to_string(),
                    serde_json::to_value(&page).unwrap_or(Value::Null),
                );

                let mut entry = Map::new();
                entry.insert("params".to_string(), Value::Object(params));
                entry.insert("props".to_string(), Value::Object(props));
                Ok(Value::Object(entry))
            })
            .collect()
    }

    /// `[page]` numbers every page, `[...page]` leaves page 1 bare
    fn first_page_numbered(&self) -> Result<bool, PaginateError> {
        let page_part = self
            .route
            .segments
            .iter()
            .flatten()
            .find(|part| part.is_dynamic() && part.content() == PAGE_PARAM);

        match page_part {
            Some(Part::Rest(_)) => Ok(false),
            Some(_) => Ok(true),
            None => Err(PaginateError::MissingPageParam {
                route: self.route.route.clone(),
            }),
        }
    }
}

fn to_route_params(params: &Map<String, Value>) -> Params {
    params
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            };
            (key.clone(), value)
        })
        .collect()
}

// ============================================================================
// rss()
// ============================================================================

/// Records the feed a route asks for
///
/// The arguments are kept as given; building the feed is up to the consumer.
#[derive(Debug, Clone, Default)]
pub struct Rss {
    request: Arc<Mutex<Option<Value>>>,
}

impl Rss {
    /// Requests a feed; a later call replaces an earlier one
    pub fn rss(&self, args: Value) {
        *self.request.lock().unwrap_or_else(|e| e.into_inner()) = Some(args);
    }

    /// The recorded feed request, if any
    pub fn request(&self) -> Option<Value> {
        self.request.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
