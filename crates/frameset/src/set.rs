//! Compiled template sets.
//!
//! A [`TemplateSet`] is an immutable snapshot of every template that compiled
//! successfully from a source. Sets are never patched: a rebuild produces a
//! new set which the [`TemplateStore`](crate::TemplateStore) swaps in whole.
//!
//! # Naming
//!
//! Files are recognized by extension (see [`TEMPLATE_EXTENSIONS`]). Each
//! template is reachable under two names:
//!
//! - its full relative path, e.g. `"pages/index.html"`
//! - its path without extension, e.g. `"pages/index"`
//!
//! When several files share an extensionless name (`page.html` and
//! `page.jinja`), the extension listed first owns the short name. Both remain
//! reachable by full path.
//!
//! # Partial success
//!
//! A file that cannot be read or fails to compile is left out of the set and
//! recorded as a [`SkippedTemplate`]. The rest of the set is still built.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use minijinja::Environment;
use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::{self, EngineOptions};
use crate::error::RenderError;
use crate::source::TemplateSource;

/// Recognized template file extensions in priority order.
pub const TEMPLATE_EXTENSIONS: &[&str] = &[".html", ".htm", ".jinja", ".j2"];

/// A template file that was left out of a set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedTemplate {
    /// Path of the file relative to the source root.
    pub path: String,
    /// Read or compile error message.
    pub reason: String,
}

/// A source entry with a recognized extension.
#[derive(Debug, Clone, PartialEq, Eq)]
struct TemplateFile {
    /// Name without extension (e.g. "pages/index")
    name: String,
    /// Name with extension (e.g. "pages/index.html")
    name_with_ext: String,
    /// Index of the extension in the configured list (lower wins)
    priority: usize,
}

impl TemplateFile {
    fn parse(path: &str, extensions: &[String]) -> Option<Self> {
        let (priority, ext) = extensions
            .iter()
            .enumerate()
            .find(|(_, ext)| path.ends_with(ext.as_str()))?;
        let name = path.strip_suffix(ext.as_str())?;
        if name.is_empty() || name.ends_with('/') {
            return None;
        }

        Some(Self {
            name: name.to_string(),
            name_with_ext: path.to_string(),
            priority,
        })
    }
}

/// An immutable, compiled collection of templates.
pub struct TemplateSet {
    version: u64,
    env: Environment<'static>,
    /// Full names of compiled templates.
    names: BTreeSet<String>,
    /// Extensionless name → full name.
    aliases: HashMap<String, String>,
    skipped: Vec<SkippedTemplate>,
}

impl TemplateSet {
    /// Compiles every recognized template in `source` into a new set.
    ///
    /// Only a failure to list the source aborts the build.
    pub(crate) fn build(
        source: &dyn TemplateSource,
        extensions: &[String],
        options: &EngineOptions,
        version: u64,
    ) -> Result<Self, RenderError> {
        let mut files: Vec<TemplateFile> = source
            .entries()?
            .iter()
            .filter_map(|path| TemplateFile::parse(path, extensions))
            .collect();
        // Stable sort: entry order is kept within one priority.
        files.sort_by_key(|f| f.priority);

        let mut env = engine::new_environment(options);
        let mut names = BTreeSet::new();
        let mut aliases = HashMap::new();
        let mut skipped = Vec::new();

        for file in files {
            let compiled = source
                .read(&file.name_with_ext)
                .map_err(|e| e.to_string())
                .and_then(|content| {
                    env.add_template_owned(file.name_with_ext.clone(), content)
                        .map_err(|e| e.to_string())
                });

            if let Err(reason) = compiled {
                warn!(template = %file.name_with_ext, %reason, "skipping template");
                skipped.push(SkippedTemplate {
                    path: file.name_with_ext,
                    reason,
                });
                continue;
            }

            aliases
                .entry(file.name)
                .or_insert_with(|| file.name_with_ext.clone());
            names.insert(file.name_with_ext);
        }

        // A real file always wins over another file's short name.
        aliases.retain(|alias, _| !names.contains(alias));
        engine::install_aliases(&mut env, aliases.clone());

        debug!(
            version,
            templates = names.len(),
            skipped = skipped.len(),
            "built template set"
        );

        Ok(Self {
            version,
            env,
            names,
            aliases,
            skipped,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Resolves a lookup name to the full name of a compiled template.
    pub fn resolve<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if let Some(full) = self.names.get(name) {
            return Some(full.as_str());
        }
        self.aliases.get(name).map(String::as_str)
    }

    /// Returns true if `name` (full or extensionless) is in the set.
    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Full names of all compiled templates, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Number of compiled templates (not counting aliases).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Templates left out of this set.
    pub fn skipped(&self) -> &[SkippedTemplate] {
        &self.skipped
    }

    /// Expands a template against `ctx`.
    ///
    /// # Errors
    ///
    /// [`RenderError::TemplateNotFound`] if the name does not resolve, or
    /// [`RenderError::Expansion`] if the engine fails.
    pub fn expand<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, RenderError> {
        let full = self
            .resolve(name)
            .ok_or_else(|| RenderError::TemplateNotFound(name.to_string()))?;
        let tmpl = self
            .env
            .get_template(full)
            .map_err(|e| RenderError::expansion(full, e))?;
        tmpl.render(ctx).map_err(|e| RenderError::expansion(full, e))
    }
}

impl fmt::Debug for TemplateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateSet")
            .field("version", &self.version)
            .field("names", &self.names)
            .field("skipped", &self.skipped)
            .finish()
    }
}
