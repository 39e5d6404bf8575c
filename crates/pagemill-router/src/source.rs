//! Directory-listing providers for the manifest walk
//!
//! The manifest builder never touches `std::fs` directly; it asks a
//! [`PageSource`] for one directory level at a time. [`FsPageSource`] reads the
//! real disk, [`MemoryPageSource`] serves an in-memory tree for tests and
//! tools that synthesize pages.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Basename of the entry
    pub name: String,
    /// Whether the entry is a directory (after following symlinks)
    pub is_dir: bool,
}

/// Synchronous directory-listing/stat provider
pub trait PageSource {
    /// Whether `dir` exists and is a directory
    fn exists(&self, dir: &Path) -> bool;

    /// Lists the direct children of `dir`
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>>;
}

impl<T: PageSource + ?Sized> PageSource for &T {
    fn exists(&self, dir: &Path) -> bool {
        (**self).exists(dir)
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        (**self).read_dir(dir)
    }
}

/// Reads pages from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsPageSource;

impl PageSource for FsPageSource {
    fn exists(&self, dir: &Path) -> bool {
        dir.is_dir()
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .map(|entry| {
                let entry = entry.map_err(io::Error::from)?;
                Ok(SourceEntry {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_dir: entry.file_type().is_dir(),
                })
            })
            .collect()
    }
}

/// In-memory page tree
///
/// Directories are implied by the files added to it.
///
/// # Examples
///
/// ```
/// use pagemill_router::source::{MemoryPageSource, PageSource};
/// use std::path::Path;
///
/// let source = MemoryPageSource::new()
///     .with_file("src/pages/index.astro")
///     .with_file("src/pages/blog/[slug].astro");
///
/// let names: Vec<String> = source
///     .read_dir(Path::new("src/pages"))
///     .unwrap()
///     .into_iter()
///     .map(|e| e.name)
///     .collect();
/// assert_eq!(names, vec!["blog", "index.astro"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryPageSource {
    files: BTreeSet<PathBuf>,
    dirs: BTreeSet<PathBuf>,
}

impl MemoryPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a source from a list of file paths
    pub fn from_files<I, P>(files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        files
            .into_iter()
            .fold(Self::new(), |source, file| source.with_file(file))
    }

    /// Adds a file, creating its parent directories
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.add_ancestors(path);
        self.files.insert(path.to_path_buf());
        self
    }

    /// Adds an empty directory
    pub fn with_dir(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.add_ancestors(path);
        self.dirs.insert(path.to_path_buf());
        self
    }

    fn add_ancestors(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if !ancestor.as_os_str().is_empty() {
                self.dirs.insert(ancestor.to_path_buf());
            }
        }
    }
}

impl PageSource for MemoryPageSource {
    fn exists(&self, dir: &Path) -> bool {
        self.dirs.contains(dir)
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<SourceEntry>> {
        if !self.dirs.contains(dir) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such directory: {}", dir.display()),
            ));
        }

        let children = |paths: &BTreeSet<PathBuf>, is_dir: bool| {
            paths
                .iter()
                .filter(|p| p.parent() == Some(dir))
                .filter_map(|p| p.file_name())
                .map(|name| SourceEntry {
                    name: name.to_string_lossy().into_owned(),
                    is_dir,
                })
                .collect::<Vec<_>>()
        };

        let mut entries = children(&self.dirs, true);
        entries.extend(children(&self.files, false));
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
