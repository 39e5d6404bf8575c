//! Route item builder
//!
//! Reads one directory level from a [`PageSource`] and turns every routable
//! entry into an [`Item`]: its tokenized segment plus the index/suffix
//! metadata the manifest walk needs. Items are short-lived; the manifest
//! builder consumes them immediately.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::error::{ManifestError, RouteValidationError};
use crate::priority::compare_items;
use crate::segment::{parse_segment, Part};
use crate::source::{PageSource, SourceEntry};

/// Guards against editor temp files and lockfiles (`foo.astro~`, `foo.astro_tmp`)
static VALID_EXTENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\.[a-z0-9]+)+$").expect("valid extension pattern"));

/// One routable directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub basename: String,
    /// Final extension including the dot, empty for directories without one
    pub ext: String,
    pub parts: Vec<Part>,
    /// Project-root relative path with forward slashes
    pub file: String,
    pub is_dir: bool,
    /// `index.*` file whose route is its parent directory
    pub is_index: bool,
    /// False for endpoint files
    pub is_page: bool,
    /// Text between the first dot and the extension (`.xml` for `index.xml.ts`)
    pub route_suffix: String,
}

/// Lists `dir`, validates every entry and returns the items in priority order
///
/// Fails on the first invalid filename; nothing is returned for a directory
/// that contains one.
pub fn read_items<S>(
    source: &S,
    dir: &Path,
    root: &Path,
    endpoint_extensions: &[String],
) -> Result<Vec<Item>, ManifestError>
where
    S: PageSource + ?Sized,
{
    let entries = source.read_dir(dir).map_err(|source| ManifestError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut items = Vec::with_capacity(entries.len());
    for entry in &entries {
        if let Some(item) = item_from_entry(entry, dir, root, endpoint_extensions)? {
            items.push(item);
        }
    }

    items.sort_by(compare_items);
    Ok(items)
}

/// Builds the item for one entry, or `None` when the entry is not routable
pub fn item_from_entry(
    entry: &SourceEntry,
    dir: &Path,
    root: &Path,
    endpoint_extensions: &[String],
) -> Result<Option<Item>, RouteValidationError> {
    let basename = entry.name.as_str();
    let ext = extname(basename);
    let name = &basename[..basename.len() - ext.len()];

    if name.starts_with('_') {
        return Ok(None);
    }
    if basename.starts_with('.') && basename != ".well-known" {
        return Ok(None);
    }
    if !entry.is_dir && !VALID_EXTENSION.is_match(ext) {
        tracing::debug!("skipping {} in {}: unsupported extension", basename, dir.display());
        return Ok(None);
    }

    let file = relative_file(&dir.join(basename), root);
    let segment = if entry.is_dir { basename } else { name };
    let parts = parse_segment(segment, &file)?;

    let is_page = entry.is_dir || !is_endpoint_extension(ext, endpoint_extensions);

    Ok(Some(Item {
        basename: basename.to_string(),
        ext: ext.to_string(),
        parts,
        file,
        is_dir: entry.is_dir,
        is_index: !entry.is_dir && basename.starts_with("index."),
        is_page,
        route_suffix: route_suffix(basename, ext),
    }))
}

/// Final extension of a basename, dot included
///
/// Leading dots do not start an extension: `.well-known` has none.
fn extname(basename: &str) -> &str {
    match basename.rfind('.') {
        Some(i) if basename[..i].chars().any(|c| c != '.') => &basename[i..],
        _ => "",
    }
}

fn route_suffix(basename: &str, ext: &str) -> String {
    if ext.is_empty() {
        return String::new();
    }
    let end = basename.len() - ext.len();
    match basename.find('.') {
        Some(start) if start < end => basename[start..end].to_string(),
        _ => String::new(),
    }
}

fn is_endpoint_extension(ext: &str, endpoint_extensions: &[String]) -> bool {
    let ext = ext.trim_start_matches('.');
    endpoint_extensions
        .iter()
        .any(|candidate| candidate.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

fn relative_file(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryPageSource;

    fn endpoints() -> Vec<String> {
        vec!["js".to_string(), "ts".to_string()]
    }

    fn file_entry(name: &str) -> SourceEntry {
        SourceEntry { name: name.to_string(), is_dir: false }
    }

    fn item(name: &str) -> Option<Item> {
        item_from_entry(&file_entry(name), Path::new("src/pages"), Path::new(""), &endpoints())
            .unwrap()
    }

    #[test]
    fn test_extname() {
        assert_eq!(extname("about.astro"), ".astro");
        assert_eq!(extname("index.xml.ts"), ".ts");
        assert_eq!(extname(".well-known"), "");
        assert_eq!(extname("blog"), "");
        assert_eq!(extname("index."), ".");
    }

    #[test]
    fn test_index_item_with_suffix() {
        let item = item("index.xml.ts").unwrap();
        assert!(item.is_index);
        assert!(!item.is_page);
        assert_eq!(item.route_suffix, ".xml");
        assert_eq!(item.parts, vec![Part::Static("index.xml".into())]);
        assert_eq!(item.file, "src/pages/index.xml.ts");
    }

    #[test]
    fn test_plain_index_has_no_suffix() {
        let item = item("index.astro").unwrap();
        assert!(item.is_index);
        assert!(item.is_page);
        assert_eq!(item.route_suffix, "");
    }

    #[test]
    fn test_underscore_and_dotfiles_are_skipped() {
        assert!(item("_hidden.astro").is_none());
        assert!(item(".hidden.astro").is_none());

        let well_known = item_from_entry(
            &SourceEntry { name: ".well-known".into(), is_dir: true },
            Path::new("src/pages"),
            Path::new(""),
            &endpoints(),
        )
        .unwrap();
        assert!(well_known.is_some());
    }

    #[test]
    fn test_temp_files_are_skipped() {
        assert!(item("about.astro~").is_none());
        assert!(item("about.astro_tmp").is_none());
        assert!(item("index.").is_none());
        assert!(item("ABOUT.ASTRO").is_some());
    }

    #[test]
    fn test_invalid_name_aborts_directory() {
        let source = MemoryPageSource::from_files([
            "src/pages/ok.astro",
            "src/pages/[a][b].astro",
        ]);
        let err = read_items(&source, Path::new("src/pages"), Path::new(""), &endpoints())
            .unwrap_err();
        match err {
            ManifestError::Validation(e) => assert_eq!(e.file(), "src/pages/[a][b].astro"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_items_come_back_sorted() {
        let source = MemoryPageSource::from_files([
            "src/pages/[slug].astro",
            "src/pages/about.astro",
            "src/pages/index.astro",
        ]);
        let items =
            read_items(&source, Path::new("src/pages"), Path::new(""), &endpoints()).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.basename.as_str()).collect();
        assert_eq!(names, vec!["index.astro", "about.astro", "[slug].astro"]);
    }
}
