//! # Pagemill Router
//!
//! Compiles a pages directory into an ordered route manifest:
//! - Static segments (`about.astro` → `/about`)
//! - Named parameters (`[slug].astro` → `/:slug`)
//! - Rest parameters (`[...path].astro` → zero or more segments)
//! - Mixed segments (`[file].[ext].ts`)
//! - Endpoints (`feed.xml.ts`) next to pages
//!
//! Every route carries a regex for matching request paths and a generator
//! that turns params back into a pathname. Sibling files are ordered by
//! specificity, so the first match in the manifest is the right one.
//!
//! ## Example
//!
//! ```
//! use pagemill_router::{ManifestBuilder, MemoryPageSource, TrailingSlash};
//!
//! let source = MemoryPageSource::from_files([
//!     "src/pages/index.astro",
//!     "src/pages/blog/[slug].astro",
//!     "src/pages/blog/[...rest].astro",
//! ]);
//! let manifest = ManifestBuilder::new(&source, "src/pages")
//!     .trailing_slash(TrailingSlash::Never)
//!     .build()
//!     .unwrap();
//!
//! let found = manifest.find("/blog/hello").unwrap();
//! assert_eq!(found.route.component, "src/pages/blog/[slug].astro");
//! assert_eq!(found.params.get("slug"), Some(&Some("hello".to_string())));
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod config;
pub mod error;
pub mod item;
pub mod manifest;
pub mod priority;
pub mod route;
pub mod segment;
pub mod source;

pub use config::{BuildConfig, Config, RoutingConfig};
pub use error::{GenerateError, ManifestError, RouteValidationError};
pub use manifest::{build_manifest, detect_route_collisions, match_route, ManifestBuilder, ManifestData};
pub use route::{Params, RouteData, RouteKind, RouteMatch, TrailingSlash};
pub use segment::Part;
pub use source::{FsPageSource, MemoryPageSource, PageSource, SourceEntry};
