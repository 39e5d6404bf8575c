//! Manifest builds against a real directory tree

use std::fs;
use std::path::Path;

use pagemill_router::*;
use pretty_assertions::assert_eq;

fn touch(root: &Path, file: &str) {
    let path = root.join(file);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, "---\n---\n").unwrap();
}

#[test]
fn test_walks_pages_directory_on_disk() {
    let project = tempfile::tempdir().unwrap();
    for file in [
        "src/pages/index.astro",
        "src/pages/blog/[slug].astro",
        "src/pages/blog/index.astro",
        "src/pages/rss.xml.ts",
        "src/pages/_drafts/wip.astro",
    ] {
        touch(project.path(), file);
    }

    let manifest = ManifestBuilder::new(FsPageSource, project.path().join("src/pages"))
        .root(project.path())
        .build()
        .unwrap();

    let components: Vec<&str> = manifest.routes.iter().map(|r| r.component.as_str()).collect();
    assert_eq!(
        components,
        vec![
            "src/pages/index.astro",
            "src/pages/rss.xml.ts",
            "src/pages/blog/index.astro",
            "src/pages/blog/[slug].astro",
        ]
    );
    assert_eq!(manifest.routes[1].kind, RouteKind::Endpoint);
}

#[test]
fn test_build_manifest_keeps_pages_dir_prefix() {
    let project = tempfile::tempdir().unwrap();
    touch(project.path(), "pages/about.astro");

    let pages = project.path().join("pages");
    let manifest = build_manifest(&pages, TrailingSlash::Never).unwrap();

    assert_eq!(manifest.len(), 1);
    let route = &manifest.routes[0];
    assert!(route.component.ends_with("pages/about.astro"));
    assert!(Path::new(&route.component).is_absolute());
    assert_eq!(route.pattern.as_str(), r"^\/about$");
}

#[test]
fn test_missing_pages_directory_builds_empty_manifest() {
    let project = tempfile::tempdir().unwrap();
    let manifest = build_manifest(project.path().join("src/pages"), TrailingSlash::Ignore).unwrap();
    assert!(manifest.is_empty());
}

#[test]
fn test_invalid_file_on_disk_fails_build() {
    let project = tempfile::tempdir().unwrap();
    touch(project.path(), "src/pages/[a][b].astro");

    let err = ManifestBuilder::new(FsPageSource, project.path().join("src/pages"))
        .root(project.path())
        .build()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid route src/pages/[a][b].astro - parameters must be separated"
    );
}
