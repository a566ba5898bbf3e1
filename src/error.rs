//! Source-anchored errors for reporting template failures.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::lexer::ScanError;
use crate::position::{Location, locate};

/// Path reported when the template has no name.
pub const UNKNOWN_PATH: &str = "<unknown>";

/// Source reported when the template text is unavailable.
pub const EMPTY_SOURCE: &str = "<empty file>";

/// Lower-level error that triggered a template error.
#[derive(Debug, Clone)]
pub enum Cause {
    /// Tokenizing failed.
    Scan(ScanError),
    /// Translating a tag body failed.
    Transform(TransformError),
    /// Any other error, with the short name of its type.
    External {
        name: String,
        error: Arc<dyn StdError + Send + Sync>,
    },
}

impl Cause {
    /// Wrap a foreign error, remembering its type name.
    #[must_use]
    pub fn external<E>(error: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::External {
            name: short_type_name::<E>().to_string(),
            error: Arc::new(error),
        }
    }

    /// Name of the error kind, as shown in `(via ...)`.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Scan(err) => err.kind.name(),
            Self::Transform(_) => "TransformError",
            Self::External { name, .. } => name,
        }
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scan(err) => err.fmt(f),
            Self::Transform(err) => err.fmt(f),
            Self::External { error, .. } => error.fmt(f),
        }
    }
}

impl StdError for Cause {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Scan(err) => err.source(),
            Self::Transform(err) => err.source(),
            Self::External { error, .. } => error.source(),
        }
    }
}

impl From<ScanError> for Cause {
    fn from(err: ScanError) -> Self {
        Self::Scan(err)
    }
}

impl From<TransformError> for Cause {
    fn from(err: TransformError) -> Self {
        Self::Transform(err)
    }
}

/// Failure while turning a tokenized tag body into render logic.
///
/// Carries a position but no path or source; re-anchor it with
/// [`TransformError::into_template_error`] once those are known.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransformError {
    pub message: String,
    /// Byte offset of the offending tag.
    pub position: usize,
    #[source]
    pub cause: Option<Box<Cause>>,
}

impl TransformError {
    #[must_use]
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
            cause: None,
        }
    }

    #[must_use]
    pub fn with_cause(mut self, cause: impl Into<Cause>) -> Self {
        self.cause = Some(Box::new(cause.into()));
        self
    }

    /// Wrap this error into a [`TemplateError`] for the owning template.
    #[must_use]
    pub fn into_template_error(self, path: &str, source: &str) -> TemplateError {
        TemplateError::new(path, source, self.position, Some(self.into()))
    }
}

/// User-facing error pointing at a line of a template file.
///
/// Displays as:
///
/// ```text
/// Error in template index.vto:3:7
///
/// <p>{{ user.name |> upper }}</p>
///
/// (via TransformError)
/// ```
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TemplateError {
    path: String,
    source_text: String,
    position: usize,
    message: String,
    #[source]
    cause: Option<Box<Cause>>,
}

impl TemplateError {
    /// Build the error and render its message.
    ///
    /// An empty `path` or `source` is reported as [`UNKNOWN_PATH`] or
    /// [`EMPTY_SOURCE`].
    #[must_use]
    pub fn new(path: &str, source: &str, position: usize, cause: Option<Cause>) -> Self {
        let path = if path.is_empty() { UNKNOWN_PATH } else { path };
        let source = if source.is_empty() {
            EMPTY_SOURCE
        } else {
            source
        };

        let Location { line, column, text } = locate(source, position);
        let mut message = format!(
            "Error in template {path}:{line}:{column}\n\n{}\n\n",
            text.trim()
        );
        if let Some(cause) = &cause {
            message.push_str(&format!("(via {})\n", cause.kind()));
        }

        Self {
            path: path.to_string(),
            source_text: source.to_string(),
            position,
            message,
            cause: cause.map(Box::new),
        }
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Full template source the position refers to.
    #[must_use]
    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Line and column of the error.
    #[must_use]
    pub fn location(&self) -> Location {
        locate(&self.source_text, self.position)
    }

    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_deref()
    }
}
