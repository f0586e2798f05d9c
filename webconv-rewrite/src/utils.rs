use std::path::Path;

use url::Url;

/// Create a regex that never matches anything.
///
/// Used as a fallback when a static pattern fails to compile, so that a bad
/// pattern degrades to a no-op instead of a panic.
#[must_use]
#[allow(clippy::unwrap_used, reason = "Both patterns are known to be valid")]
pub fn never_matching_regex() -> regex::Regex {
  regex::Regex::new(r"[^\s\S]")
    .unwrap_or_else(|_| regex::Regex::new(r"^\b$").unwrap())
}

/// Turn a file name into a readable title: the stem with hyphens and
/// underscores replaced by spaces, every word capitalised.
///
/// `getting-started_guide.html` becomes `Getting Started Guide`.
#[must_use]
pub fn title_from_file_name(path: &Path) -> String {
  let stem = path
    .file_stem()
    .map(|s| s.to_string_lossy())
    .unwrap_or_default()
    .replace(['-', '_'], " ");
  title_case(&stem)
}

/// Capitalise the first letter of every run of letters and lowercase the
/// rest.
#[must_use]
pub fn title_case(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut prev_is_letter = false;
  for c in text.chars() {
    if c.is_alphabetic() {
      if prev_is_letter {
        out.extend(c.to_lowercase());
      } else {
        out.extend(c.to_uppercase());
      }
      prev_is_letter = true;
    } else {
      out.push(c);
      prev_is_letter = false;
    }
  }
  out
}

/// Join the components of a relative path with `/`, regardless of platform,
/// percent-encoding each component so it is safe inside an `href`.
#[must_use]
pub fn to_web_path(rel_path: &Path) -> String {
  let segments: Vec<_> = rel_path
    .components()
    .map(|c| c.as_os_str().to_string_lossy().into_owned())
    .collect();

  let Ok(mut url) = Url::parse("http://localhost/") else {
    return segments.join("/");
  };
  if let Ok(mut path) = url.path_segments_mut() {
    path.clear().extend(&segments);
  }
  url.path().trim_start_matches('/').to_string()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_title_from_file_name() {
    assert_eq!(
      title_from_file_name(Path::new("docs/getting-started_guide.html")),
      "Getting Started Guide"
    );
    assert_eq!(title_from_file_name(Path::new("FAQ.htm")), "Faq");
    assert_eq!(title_from_file_name(Path::new("2nd-edition.md")), "2Nd Edition");
  }

  #[test]
  fn test_to_web_path() {
    let path: std::path::PathBuf = ["a", "b", "c.html"].iter().collect();
    assert_eq!(to_web_path(&path), "a/b/c.html");

    let path: std::path::PathBuf =
      ["my docs", "q?a#1.html"].iter().collect();
    assert_eq!(to_web_path(&path), "my%20docs/q%3Fa%231.html");
  }

  #[test]
  fn test_never_matching_regex() {
    let re = never_matching_regex();
    assert!(!re.is_match(""));
    assert!(!re.is_match("anything at all"));
  }
}
