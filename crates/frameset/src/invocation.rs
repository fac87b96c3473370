//! Per-request render state and frame composition.
//!
//! An [`Invocation`] collects everything a handler decides about a response
//! before rendering it:
//!
//! - values visible to the content template ([`Invocation::set`])
//! - frames to wrap the content in ([`Invocation::use_frame`])
//! - arguments visible to every frame ([`Invocation::set_frame_arg`])
//!
//! # Composition
//!
//! [`Invocation::render`] expands the content template, then expands each
//! frame in turn with the previous output bound to `Content`:
//!
//! ```text
//! output = expand(content, values)
//! for frame in invocation_frames ++ global_frames:
//!     output = expand(frame, frame.args + frame_args + { Content: output })
//! ```
//!
//! Invocation frames are applied in registration order, and the store's
//! global frames wrap the result. All templates come from a single snapshot
//! of the store, so a concurrent rebuild cannot mix two template versions in
//! one response.
//!
//! Rendering does not consume the invocation; rendering twice with the same
//! state gives the same output.

use std::collections::BTreeMap;

use minijinja::Value;
use serde::Serialize;
use tracing::debug;

use crate::engine;
use crate::error::RenderError;
use crate::store::TemplateStore;

/// Content type of every [`HtmlPage`].
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// A layout template applied around rendered content, with its own arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameRef {
    name: String,
    args: BTreeMap<String, Value>,
}

impl FrameRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: BTreeMap::new(),
        }
    }

    /// Adds an argument visible only to this frame.
    pub fn arg<T: Serialize>(mut self, key: impl Into<String>, value: T) -> Self {
        self.args.insert(key.into(), Value::from_serialize(&value));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &BTreeMap<String, Value> {
        &self.args
    }
}

/// A fully rendered HTML response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlPage {
    pub status: u16,
    pub body: String,
}

impl HtmlPage {
    pub fn content_type(&self) -> &'static str {
        HTML_CONTENT_TYPE
    }
}

/// Render state for a single request.
///
/// Created with [`TemplateStore::invocation`].
#[derive(Debug, Clone)]
pub struct Invocation {
    store: TemplateStore,
    values: BTreeMap<String, Value>,
    frames: Vec<FrameRef>,
    frame_args: BTreeMap<String, Value>,
}

impl Invocation {
    pub(crate) fn new(store: TemplateStore) -> Self {
        Self {
            store,
            values: BTreeMap::new(),
            frames: Vec::new(),
            frame_args: BTreeMap::new(),
        }
    }

    /// Sets a value for the content template, replacing any previous value.
    pub fn set<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
        self.values.insert(key.into(), Value::from_serialize(&value));
        self
    }

    /// Wraps the content in another frame, outside any frame added before.
    pub fn use_frame(&mut self, name: impl Into<String>) -> &mut Self {
        self.frames.push(FrameRef::new(name));
        self
    }

    /// Like [`use_frame`](Self::use_frame), with arguments for that frame only.
    pub fn use_frame_ref(&mut self, frame: FrameRef) -> &mut Self {
        self.frames.push(frame);
        self
    }

    /// Sets an argument visible to every frame, including global frames.
    ///
    /// The content template does not see it.
    pub fn set_frame_arg<T: Serialize>(&mut self, key: impl Into<String>, value: T) -> &mut Self {
        self.frame_args
            .insert(key.into(), Value::from_serialize(&value));
        self
    }

    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Frames registered on this invocation, innermost first.
    pub fn frames(&self) -> &[FrameRef] {
        &self.frames
    }

    pub fn frame_args(&self) -> &BTreeMap<String, Value> {
        &self.frame_args
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Renders `name` and wraps it in every frame.
    ///
    /// # Errors
    ///
    /// [`RenderError::TemplateNotFound`] if the content template or any frame
    /// is missing, [`RenderError::Expansion`] if any expansion fails. Nothing
    /// is returned on failure.
    pub fn render(&self, name: &str) -> Result<String, RenderError> {
        let set = self.store.snapshot();

        let mut output = set.expand(name, &self.values)?;
        for frame in self.frames.iter().chain(self.store.global_frames()) {
            let ctx = engine::frame_context(&frame.args, &self.frame_args, output);
            output = set.expand(&frame.name, ctx)?;
        }

        debug!(
            template = name,
            frames = self.frames.len() + self.store.global_frames().len(),
            version = set.version(),
            "rendered"
        );
        Ok(output)
    }

    /// Renders `name` into an HTML page with the given status.
    pub fn html_page(&self, status: u16, name: &str) -> Result<HtmlPage, RenderError> {
        let body = self.render(name)?;
        Ok(HtmlPage { status, body })
    }
}
