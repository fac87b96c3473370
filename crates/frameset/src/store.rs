//! The shared template store.
//!
//! [`TemplateStore`] owns the template source and the currently published
//! [`TemplateSet`]. It is cheap to clone; clones share the same state.
//!
//! # Concurrency
//!
//! The published set sits behind a `RwLock<Arc<TemplateSet>>`. Readers take
//! the shared lock only long enough to clone the `Arc`, then render from that
//! snapshot without holding any lock. A rebuild compiles the new set privately
//! and takes the exclusive lock only to replace the pointer, so readers never
//! see a half-built set.
//!
//! # Example
//!
//! ```rust
//! use frameset::{MemorySource, TemplateStore};
//!
//! let source = MemorySource::new()
//!     .with("index.html", "Template: {{ alpha }} - {{ bravo }}")
//!     .with("frame.html", "Frame: [{{ Content }}]")
//!     .with("global.html", "Global: [{{ Content }}]");
//!
//! let store = TemplateStore::builder(source)
//!     .frame("global.html")
//!     .build()
//!     .unwrap();
//!
//! let mut inv = store.invocation();
//! inv.use_frame("frame.html");
//! inv.set("alpha", "Hello").set("bravo", "World");
//!
//! assert_eq!(
//!     inv.render("index.html").unwrap(),
//!     "Global: [Frame: [Template: Hello - World]]"
//! );
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use minijinja::Environment;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::RenderConfig;
use crate::engine::{EngineOptions, EnvironmentHook};
use crate::error::RenderError;
use crate::invocation::{FrameRef, Invocation};
use crate::set::{TemplateSet, TEMPLATE_EXTENSIONS};
use crate::source::TemplateSource;

struct StoreInner {
    source: Box<dyn TemplateSource>,
    extensions: Vec<String>,
    engine: EngineOptions,
    global_frames: Vec<FrameRef>,
    current: RwLock<Arc<TemplateSet>>,
    next_version: AtomicU64,
}

/// Compiled templates shared across requests.
#[derive(Clone)]
pub struct TemplateStore {
    inner: Arc<StoreInner>,
}

impl TemplateStore {
    /// Builds a store with default settings and no global frames.
    pub fn new(source: impl TemplateSource + 'static) -> Result<Self, RenderError> {
        Self::builder(source).build()
    }

    pub fn builder(source: impl TemplateSource + 'static) -> StoreBuilder {
        StoreBuilder::new(source)
    }

    /// Starts a new, empty invocation bound to this store.
    pub fn invocation(&self) -> Invocation {
        Invocation::new(self.clone())
    }

    /// Global frames, innermost first.
    pub fn global_frames(&self) -> &[FrameRef] {
        &self.inner.global_frames
    }

    /// Walks the source and compiles a new set without publishing it.
    pub fn build(&self) -> Result<TemplateSet, RenderError> {
        let version = self.inner.next_version.fetch_add(1, Ordering::Relaxed);
        TemplateSet::build(
            self.inner.source.as_ref(),
            &self.inner.extensions,
            &self.inner.engine,
            version,
        )
    }

    /// Publishes `set` unconditionally, replacing the current one. Returns the
    /// previous set. [`rebuild`](Self::rebuild) is the version-checked path.
    pub fn swap(&self, set: TemplateSet) -> Arc<TemplateSet> {
        let set = Arc::new(set);
        let mut current = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        debug!(from = current.version(), to = set.version(), "swapping template set");
        std::mem::replace(&mut *current, set)
    }

    /// Builds and publishes a new set. Returns the version now published.
    ///
    /// Concurrent rebuilds may finish out of order; a set older than the
    /// published one is discarded, so the returned version can be newer than
    /// the set this call built. On error the current set stays published.
    pub fn rebuild(&self) -> Result<u64, RenderError> {
        let set = self.build()?;
        let (version, templates, skipped) = (set.version(), set.len(), set.skipped().len());

        let set = Arc::new(set);
        let mut current = self
            .inner
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if current.version() > version {
            debug!(
                discarded = version,
                published = current.version(),
                "discarding template set from an overtaken rebuild"
            );
            return Ok(current.version());
        }
        *current = set;
        drop(current);

        info!(version, templates, skipped, "rebuilt templates");
        Ok(version)
    }

    /// Returns the currently published set.
    pub fn snapshot(&self) -> Arc<TemplateSet> {
        self.inner
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Looks up a template in the current set.
    pub fn lookup(&self, name: &str) -> Option<CompiledTemplate> {
        let set = self.snapshot();
        let full = set.resolve(name)?.to_string();
        Some(CompiledTemplate { set, name: full })
    }
}

impl fmt::Debug for TemplateStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateStore")
            .field("extensions", &self.inner.extensions)
            .field("engine", &self.inner.engine)
            .field("global_frames", &self.inner.global_frames)
            .field("current", &self.snapshot())
            .finish()
    }
}

/// A template resolved from a specific set.
///
/// Holds the set alive, so it keeps working after a swap.
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    set: Arc<TemplateSet>,
    name: String,
}

impl CompiledTemplate {
    /// Full name of the template.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Version of the set the template came from.
    pub fn version(&self) -> u64 {
        self.set.version()
    }

    pub fn render<S: Serialize>(&self, ctx: S) -> Result<String, RenderError> {
        self.set.expand(&self.name, ctx)
    }
}

/// Builder for [`TemplateStore`].
pub struct StoreBuilder {
    source: Box<dyn TemplateSource>,
    extensions: Vec<String>,
    engine: EngineOptions,
    global_frames: Vec<FrameRef>,
}

impl StoreBuilder {
    pub fn new(source: impl TemplateSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            extensions: TEMPLATE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            engine: EngineOptions::default(),
            global_frames: Vec::new(),
        }
    }

    /// Registers a global frame. Frames registered later wrap earlier ones.
    pub fn frame(self, name: impl Into<String>) -> Self {
        self.frame_ref(FrameRef::new(name))
    }

    /// Registers a global frame carrying its own arguments.
    pub fn frame_ref(mut self, frame: FrameRef) -> Self {
        self.global_frames.push(frame);
        self
    }

    /// Replaces the recognized extensions, highest priority first.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Makes undefined values an expansion error.
    pub fn strict(mut self, strict: bool) -> Self {
        self.engine.strict = strict;
        self
    }

    /// Adds a hook run on every newly built environment.
    pub fn configure_environment<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Environment<'static>) + Send + Sync + 'static,
    {
        let hook: EnvironmentHook = Arc::new(hook);
        self.engine.hooks.push(hook);
        self
    }

    /// Applies file-based configuration.
    ///
    /// Extensions and strictness are replaced when set; frames are appended.
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        if let Some(extensions) = config.extensions {
            self.extensions = extensions;
        }
        if let Some(strict) = config.strict {
            self.engine.strict = strict;
        }
        for frame in config.frames {
            self.global_frames.push(frame.into_frame_ref());
        }
        self
    }

    /// Compiles the initial set and returns the store.
    ///
    /// # Errors
    ///
    /// Fails if no extensions are configured, an extension does not start with
    /// a `.`, or the source cannot be listed. Individual template failures do
    /// not fail the build.
    pub fn build(self) -> Result<TemplateStore, RenderError> {
        if self.extensions.is_empty() {
            return Err(RenderError::Config(
                "at least one template extension is required".to_string(),
            ));
        }
        if let Some(bad) = self.extensions.iter().find(|e| !e.starts_with('.') || e.len() < 2) {
            return Err(RenderError::Config(format!(
                "invalid template extension \"{bad}\""
            )));
        }

        let initial = TemplateSet::build(self.source.as_ref(), &self.extensions, &self.engine, 1)?;
        info!(
            templates = initial.len(),
            skipped = initial.skipped().len(),
            global_frames = self.global_frames.len(),
            "template store ready"
        );

        Ok(TemplateStore {
            inner: Arc::new(StoreInner {
                source: self.source,
                extensions: self.extensions,
                engine: self.engine,
                global_frames: self.global_frames,
                current: RwLock::new(Arc::new(initial)),
                next_version: AtomicU64::new(2),
            }),
        })
    }
}
