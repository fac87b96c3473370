//! Template sources.
//!
//! A [`TemplateSource`] is a hierarchical, path-addressed store of raw
//! template text. The store never touches the filesystem directly; it asks the
//! source for its entries and reads each one.
//!
//! Two implementations are provided:
//!
//! - [`DirSource`]: a directory on disk, walked recursively
//! - [`MemorySource`]: an in-memory map, useful for tests and embedded templates
//!
//! Entry names always use forward slashes and are relative to the source root
//! (e.g. `"pages/index.html"`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::SourceError;

/// A read-only, path-addressed collection of template files.
pub trait TemplateSource: Send + Sync {
    /// Lists every file in the source, relative to its root.
    ///
    /// Files with unrecognized extensions are included; filtering is done by
    /// the store.
    fn entries(&self) -> Result<Vec<String>, SourceError>;

    /// Reads the text of a single entry.
    fn read(&self, name: &str) -> Result<String, SourceError>;
}

/// Templates read from a directory tree.
///
/// # Example
///
/// ```rust,no_run
/// use frameset::{DirSource, TemplateSource};
///
/// let source = DirSource::new("./templates");
/// for name in source.entries()? {
///     println!("{name}");
/// }
/// # Ok::<(), frameset::SourceError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateSource for DirSource {
    fn entries(&self) -> Result<Vec<String>, SourceError> {
        if !self.root.is_dir() {
            return Err(SourceError::RootNotFound {
                path: self.root.clone(),
            });
        }

        let mut names = Vec::new();
        walk_dir_recursive(&self.root, &self.root, &mut names)?;
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String, SourceError> {
        // Entry names never climb out of the root.
        if name.split('/').any(|part| part == "..") {
            return Err(SourceError::NoSuchEntry {
                name: name.to_string(),
            });
        }

        let path = self.root.join(name);
        std::fs::read_to_string(&path).map_err(|source| SourceError::Io { path, source })
    }
}

/// Recursive helper for directory walking.
fn walk_dir_recursive(
    current: &Path,
    root: &Path,
    names: &mut Vec<String>,
) -> Result<(), SourceError> {
    let entries = std::fs::read_dir(current).map_err(|source| SourceError::Io {
        path: current.to_path_buf(),
        source,
    })?;

    for entry in entries {
        let entry = entry.map_err(|source| SourceError::Io {
            path: current.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|source| SourceError::Io {
            path: path.clone(),
            source,
        })?;

        // Symlinked directories are not followed; a link back to an
        // ancestor would recurse forever. Symlinked files are read.
        if file_type.is_dir() {
            walk_dir_recursive(&path, root, names)?;
        } else if file_type.is_file() || (file_type.is_symlink() && path.is_file()) {
            if let Ok(relative) = path.strip_prefix(root) {
                let name = relative
                    .to_string_lossy()
                    .replace(std::path::MAIN_SEPARATOR, "/");
                names.push(name);
            }
        }
    }

    Ok(())
}

/// Templates held in memory.
///
/// ```rust
/// use frameset::{MemorySource, TemplateSource};
///
/// let source = MemorySource::new()
///     .with("index.html", "Hello {{ name }}")
///     .with("frame.html", "[{{ Content }}]");
///
/// assert_eq!(source.entries().unwrap(), vec!["frame.html", "index.html"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: BTreeMap<String, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, builder style.
    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.insert(name, content);
        self
    }

    /// Adds or replaces a file.
    pub fn insert(&mut self, name: impl Into<String>, content: impl Into<String>) {
        self.files.insert(name.into(), content.into());
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl<N, C> FromIterator<(N, C)> for MemorySource
where
    N: Into<String>,
    C: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, C)>>(iter: I) -> Self {
        let mut source = MemorySource::new();
        for (name, content) in iter {
            source.insert(name, content);
        }
        source
    }
}

impl TemplateSource for MemorySource {
    fn entries(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read(&self, name: &str) -> Result<String, SourceError> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| SourceError::NoSuchEntry {
                name: name.to_string(),
            })
    }
}
