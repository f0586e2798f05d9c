//! Pages: one mirrored input file mapped to one output file.
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What kind of content a file holds, judged by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
  Markdown,
  Html,
  Other,
}

impl ContentKind {
  #[must_use]
  pub fn from_path(path: &Path) -> Self {
    let ext = path
      .extension()
      .map(|e| e.to_string_lossy().to_ascii_lowercase());
    match ext.as_deref() {
      Some("md") => Self::Markdown,
      Some("html" | "htm") => Self::Html,
      _ => Self::Other,
    }
  }
}

/// A discovered input file and the output file it maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
  /// Absolute or working-directory-relative path of the source file.
  pub source:   PathBuf,
  /// Path relative to the download root.
  pub rel_path: PathBuf,
  pub kind:     ContentKind,
}

impl Page {
  /// Describe `source`, which must live below `download_root`.
  ///
  /// Returns `None` when `source` is not inside `download_root`.
  #[must_use]
  pub fn discover(download_root: &Path, source: &Path) -> Option<Self> {
    let rel_path = source.strip_prefix(download_root).ok()?.to_path_buf();
    Some(Self {
      source: source.to_path_buf(),
      kind: ContentKind::from_path(&rel_path),
      rel_path,
    })
  }

  /// Output path relative to the site directory: Markdown sources become
  /// `.html`, everything else keeps its name.
  #[must_use]
  pub fn output_rel_path(&self) -> PathBuf {
    let mut path = self.rel_path.clone();
    if self.kind == ContentKind::Markdown {
      path.set_extension("html");
    }
    path
  }

  /// Target path under `<output_root>/<domain>/`.
  #[must_use]
  pub fn target_path(&self, output_root: &Path, domain: &str) -> PathBuf {
    output_root.join(domain).join(self.output_rel_path())
  }
}

/// Result of converting one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Converted {
  /// Final UTF-8 HTML document.
  pub html:        String,
  /// Title used for the page, if one was determined.
  pub title:       Option<String>,
  /// Name of the encoding the source was decoded from.
  pub encoding:    &'static str,
  /// Whether undecodable bytes were replaced during decoding.
  pub lossy:       bool,
  /// Whether the source was a fragment wrapped in the page shell.
  pub synthesized: bool,
}
