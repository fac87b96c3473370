//! Error types for template loading and rendering.
//!
//! [`RenderError`] is the error returned by every public rendering operation.
//! It hides the underlying engine's error type behind a stable set of
//! variants. [`SourceError`] covers failures of the template source itself.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while listing or reading templates from a [`TemplateSource`](crate::TemplateSource).
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source root does not exist or is not a directory.
    #[error("template root not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    /// The requested entry is not part of the source.
    #[error("template source has no entry \"{name}\"")]
    NoSuchEntry { name: String },

    /// Reading a directory or file failed.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error type for rendering operations.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested content or frame template has no compiled entry.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// The engine failed while expanding a template.
    ///
    /// The engine error keeps the template line and any nested cause.
    #[error("failed to expand template \"{name}\": {source}")]
    Expansion {
        name: String,
        #[source]
        source: minijinja::Error,
    },

    /// The template source could not be walked.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl RenderError {
    /// Wraps an engine error raised while expanding `name`.
    ///
    /// Engine-level "template not found" errors (e.g. a missing `{% include %}`)
    /// keep their own variant.
    pub(crate) fn expansion(name: &str, err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::TemplateNotFound => RenderError::TemplateNotFound(err.to_string()),
            _ => RenderError::Expansion {
                name: name.to_string(),
                source: err,
            },
        }
    }

    /// Returns true for the not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RenderError::TemplateNotFound(_))
    }
}

impl From<serde_yaml::Error> for RenderError {
    fn from(err: serde_yaml::Error) -> Self {
        RenderError::Config(err.to_string())
    }
}
