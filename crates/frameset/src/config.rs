//! File-based store configuration.
//!
//! [`RenderConfig`] mirrors the options of [`StoreBuilder`](crate::StoreBuilder)
//! in a form that can be loaded from YAML:
//!
//! ```yaml
//! strict: true
//! extensions: [".html", ".jinja"]
//! frames:
//!   - layouts/base.html
//!   - name: layouts/shell.html
//!     args:
//!       site: Example
//! ```
//!
//! Every key is optional. Frames are listed innermost first.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::error::RenderError;
use crate::invocation::FrameRef;

/// Store options loaded from a configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderConfig {
    /// Recognized template extensions, highest priority first.
    #[serde(default)]
    pub extensions: Option<Vec<String>>,

    /// Treat undefined values as expansion errors.
    #[serde(default)]
    pub strict: Option<bool>,

    /// Global frames, innermost first.
    #[serde(default)]
    pub frames: Vec<FrameConfig>,
}

impl RenderConfig {
    /// Parses a YAML document.
    ///
    /// An empty document yields the default configuration.
    pub fn from_yaml(yaml: &str) -> Result<Self, RenderError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }
}

/// A global frame entry: either a bare template name or a name with arguments.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FrameConfig {
    Name(String),
    WithArgs {
        name: String,
        #[serde(default)]
        args: BTreeMap<String, serde_yaml::Value>,
    },
}

impl FrameConfig {
    pub fn name(&self) -> &str {
        match self {
            FrameConfig::Name(name) => name,
            FrameConfig::WithArgs { name, .. } => name,
        }
    }

    pub(crate) fn into_frame_ref(self) -> FrameRef {
        match self {
            FrameConfig::Name(name) => FrameRef::new(name),
            FrameConfig::WithArgs { name, args } => args
                .into_iter()
                .fold(FrameRef::new(name), |frame, (key, value)| frame.arg(key, value)),
        }
    }
}
