//! # Frameset - Layout-Framed HTML Rendering
//!
//! `frameset` renders HTML pages from a directory of [MiniJinja] templates and
//! wraps them in layout templates ("frames").
//!
//! ## Core Concepts
//!
//! - [`TemplateSource`]: where template text comes from ([`DirSource`], [`MemorySource`])
//! - [`TemplateStore`]: the compiled [`TemplateSet`], shared across requests and
//!   hot-swappable with [`TemplateStore::rebuild`]
//! - [`Invocation`]: per-request values, frames and frame arguments, plus the
//!   composed [`render`](Invocation::render)
//! - Global frames: configured once on the store, applied around every render
//!
//! ## Quick Start
//!
//! ```rust
//! use frameset::{MemorySource, TemplateStore};
//!
//! let source = MemorySource::new()
//!     .with("index.html", "Template: {{ alpha }} - {{ bravo }}")
//!     .with("frame.html", "{{ frameName }}: [{{ Content }}]")
//!     .with("global.html", "{{ frameName }}: [{{ Content }}]");
//!
//! let store = TemplateStore::builder(source)
//!     .frame("global.html")
//!     .build()
//!     .unwrap();
//!
//! let mut inv = store.invocation();
//! inv.use_frame("frame.html")
//!     .set("alpha", "Hello")
//!     .set("bravo", "World")
//!     .set_frame_arg("frameName", "The Frame");
//!
//! assert_eq!(
//!     inv.render("index.html").unwrap(),
//!     "The Frame: [The Frame: [Template: Hello - World]]"
//! );
//! ```
//!
//! ## Templates on Disk
//!
//! ```rust,no_run
//! use frameset::{DirSource, TemplateStore};
//!
//! let store = TemplateStore::builder(DirSource::new("./templates"))
//!     .frame("layouts/shell.html")
//!     .build()?;
//!
//! // After templates change on disk:
//! store.rebuild()?;
//! # Ok::<(), frameset::RenderError>(())
//! ```
//!
//! Templates that fail to compile are logged and left out; see
//! [`TemplateSet::skipped`].
//!
//! [MiniJinja]: https://docs.rs/minijinja

pub mod config;
pub mod engine;
mod error;
pub mod invocation;
pub mod set;
pub mod source;
pub mod store;

pub use config::{FrameConfig, RenderConfig};
pub use engine::{EngineOptions, EnvironmentHook, CONTENT_KEY};
pub use error::{RenderError, SourceError};
pub use invocation::{FrameRef, HtmlPage, Invocation, HTML_CONTENT_TYPE};
pub use set::{SkippedTemplate, TemplateSet, TEMPLATE_EXTENSIONS};
pub use source::{DirSource, MemorySource, TemplateSource};
pub use store::{CompiledTemplate, StoreBuilder, TemplateStore};

// Re-export for hook authors.
pub use minijinja;
