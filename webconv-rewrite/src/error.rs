use std::{io, path::PathBuf};

use thiserror::Error;

/// Error type for the rewriting pipeline.
#[derive(Debug, Error)]
pub enum RewriteError {
  #[error("I/O error on {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Template error: {0}")]
  Template(String),

  #[error("Failed to serialize HTML: {0}")]
  Serialize(#[source] io::Error),

  #[error("Failed to walk directory: {0}")]
  Walk(#[from] walkdir::Error),

  #[error("Invalid site domain: {0:?}")]
  InvalidDomain(String),

  #[error("Invalid source URL {url:?}: {reason}")]
  InvalidUrl { url: String, reason: String },

  #[error("Markdown rendering is not available in this build")]
  MarkdownUnavailable,
}

impl RewriteError {
  /// Attach the offending path to an I/O error.
  pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io {
      path: path.into(),
      source,
    }
  }
}

impl From<tera::Error> for RewriteError {
  fn from(e: tera::Error) -> Self {
    // Tera hides the interesting part of the message in the source chain
    let mut message = e.to_string();
    let mut source = std::error::Error::source(&e);
    while let Some(inner) = source {
      message.push_str(": ");
      message.push_str(&inner.to_string());
      source = inner.source();
    }
    Self::Template(message)
  }
}

/// Result type for rewriting operations.
pub type Result<T> = std::result::Result<T, RewriteError>;
