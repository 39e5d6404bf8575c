//! # Pagemill Paths - Static Path Resolution
//!
//! Turns the dynamic routes of a manifest into concrete pages.
//!
//! ## Features
//!
//! - **Single-flight resolution**: a route's `getStaticPaths` runs once, no
//!   matter how many callers ask for it concurrently
//! - **Validation**: malformed results fail the route, questionable params are
//!   warned about and kept
//! - **Helpers**: `paginate()` and `rss()` bound to the route being resolved
//! - **Prerender planning**: parallel fan-out with deterministic conflict
//!   resolution
//! - **Request lookup**: match a pathname and find its props
//!
//! ## Example
//!
//! ```rust
//! use pagemill_paths::{ModuleRegistry, PageModule, Session, StaticPathsHelpers};
//! use pagemill_router::{Config, MemoryPageSource};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = MemoryPageSource::from_files([
//!         "src/pages/index.astro",
//!         "src/pages/blog/[slug].astro",
//!     ]);
//!     let modules = ModuleRegistry::new().with_module(
//!         "src/pages/blog/[slug].astro",
//!         PageModule::with_static_paths(|_helpers: StaticPathsHelpers| async {
//!             Ok::<_, anyhow::Error>(json!([
//!                 { "params": { "slug": "hello" }, "props": { "title": "Hello" } },
//!             ]))
//!         }),
//!     );
//!
//!     let session = Session::new(Config::default(), source, modules).unwrap();
//!     let plan = session.prerender().await.unwrap();
//!     assert_eq!(plan.pathnames().collect::<Vec<_>>(), vec!["/", "/blog/hello/"]);
//!
//!     let page = session.lookup("/blog/hello").await.unwrap().unwrap();
//!     assert_eq!(page.props, Some(json!({ "title": "Hello" })));
//! }
//! ```

pub mod cache;
pub mod error;
pub mod helpers;
pub mod lookup;
pub mod module;
pub mod plan;
pub mod resolve;
pub mod session;

pub use cache::{CacheStats, ResolutionState, RouteCache};
pub use error::{
    BuildError, PaginateError, ParamWarningKind, PrerenderRouteConflict, StaticPathsError,
    StaticPathsParamWarning,
};
pub use helpers::{Page, PageUrls, Paginate, PaginateOptions, Rss, StaticPathsHelpers};
pub use lookup::{get_params_and_props, PageRequest};
pub use module::{GetStaticPaths, ModuleRegistry, PageModule};
pub use plan::{plan_prerender, PrerenderPath, PrerenderPlan};
pub use resolve::{params_key, resolve_static_paths, validate_static_paths, ResolvedPaths, StaticPath};
pub use session::Session;
