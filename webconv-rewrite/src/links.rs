//! Canonicalisation of `href`/`src` values into on-site links.
//!
//! Every on-site link in the output tree is absolute and lives below
//! `/<domain>/`. Markdown sources are served as `.html`, and extensionless
//! paths are assumed to be pages.
use std::sync::LazyLock;

use regex::Regex;

use crate::utils::never_matching_regex;

/// Prefixes that mark a link as leaving the mirrored site, or as not being a
/// path at all.
const PASSTHROUGH_PREFIXES: &[&str] = &[
  "http://",
  "https://",
  "mailto:",
  "tel:",
  "javascript:",
  "ftp://",
  "data:",
  "//",
  "#",
  "?",
];

/// A trailing file extension on the last path segment.
static EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"\.[A-Za-z0-9]+$").unwrap_or_else(|e| {
    log::error!("Failed to compile EXTENSION_RE regex: {e}");
    never_matching_regex()
  })
});

/// How a link is treated by [`normalize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
  /// Absolute URL, non-HTTP scheme, anchor or query-only link.
  Passthrough,
  /// Leads with `/`.
  Absolute,
  /// Anything else; resolved against the domain root.
  Relative,
}

/// Classify a raw attribute value.
#[must_use]
pub fn classify(link: &str) -> LinkKind {
  let lower = link.trim_start().to_ascii_lowercase();
  if link.is_empty()
    || PASSTHROUGH_PREFIXES
      .iter()
      .any(|prefix| lower.starts_with(prefix))
  {
    LinkKind::Passthrough
  } else if link.starts_with('/') {
    LinkKind::Absolute
  } else {
    LinkKind::Relative
  }
}

/// Rewrite `link` into its canonical on-site form for `domain`.
///
/// Passthrough links come back unchanged. For everything else a `.md`
/// suffix becomes `.html`, an extensionless path that does not end in `/`
/// gains `.html`, and the path is anchored under `/<domain>/`. Any query
/// string or fragment is preserved after the rewritten path. The function is
/// idempotent.
#[must_use]
pub fn normalize(link: &str, domain: &str) -> String {
  let kind = classify(link);
  if kind == LinkKind::Passthrough {
    return link.to_string();
  }

  let (path, suffix) = split_suffix(link);
  let path = fix_extension(path);

  let prefixed = match kind {
    LinkKind::Absolute => {
      if path.starts_with(&format!("/{domain}/")) {
        path
      } else {
        format!("/{domain}{path}")
      }
    },
    LinkKind::Relative => format!("/{domain}/{path}"),
    LinkKind::Passthrough => path,
  };

  format!("{prefixed}{suffix}")
}

/// Split a link at the first `?` or `#`.
fn split_suffix(link: &str) -> (&str, &str) {
  link
    .find(['?', '#'])
    .map_or((link, ""), |idx| link.split_at(idx))
}

fn fix_extension(path: &str) -> String {
  if let Some(stem) = path.strip_suffix(".md") {
    return format!("{stem}.html");
  }

  if path.ends_with('/') {
    return path.to_string();
  }

  let last_segment = path.rsplit('/').next().unwrap_or(path);
  if EXTENSION_RE.is_match(last_segment) {
    path.to_string()
  } else {
    format!("{path}.html")
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_classify() {
    assert_eq!(classify("https://example.com"), LinkKind::Passthrough);
    assert_eq!(classify("MAILTO:me@example.com"), LinkKind::Passthrough);
    assert_eq!(classify("#top"), LinkKind::Passthrough);
    assert_eq!(classify(""), LinkKind::Passthrough);
    assert_eq!(classify("/docs/a.html"), LinkKind::Absolute);
    assert_eq!(classify("docs/a.html"), LinkKind::Relative);
    assert_eq!(classify("../a.html"), LinkKind::Relative);
  }

  #[test]
  fn test_split_suffix() {
    assert_eq!(split_suffix("a.md?x=1#y"), ("a.md", "?x=1#y"));
    assert_eq!(split_suffix("a.md#y?z"), ("a.md", "#y?z"));
    assert_eq!(split_suffix("a.md"), ("a.md", ""));
  }

  #[test]
  fn test_fix_extension() {
    assert_eq!(fix_extension("guide.md"), "guide.html");
    assert_eq!(fix_extension("guide"), "guide.html");
    assert_eq!(fix_extension("dir/"), "dir/");
    assert_eq!(fix_extension("v1.2/page"), "v1.2/page.html");
    assert_eq!(fix_extension("archive.tar.gz"), "archive.tar.gz");
  }
}
