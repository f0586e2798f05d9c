//! DOM helpers shared by the content rewriter, the Markdown renderer and the
//! site indexer.
use std::sync::LazyLock;

use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{QualName, local_name, ns};
use regex::Regex;
use tendril::TendrilSink;

use crate::{
  error::{Result, RewriteError},
  links,
  utils::never_matching_regex,
};

/// Attributes that carry links and get normalized.
const LINK_ATTRIBUTES: [&str; 2] = ["href", "src"];

/// Opening `<html>` tag of a complete document.
static HTML_ROOT_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)<html[\s>/]").unwrap_or_else(|e| {
    log::error!("Failed to compile HTML_ROOT_RE regex: {e}");
    never_matching_regex()
  })
});

/// Comments and raw-text elements, whose contents are never markup.
static OPAQUE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r"(?is)<!--.*?(?:-->|\z)|<script\b.*?(?:</script\s*>|\z)|<style\b.*?(?:</style\s*>|\z)",
  )
  .unwrap_or_else(|e| {
    log::error!("Failed to compile OPAQUE_RE regex: {e}");
    never_matching_regex()
  })
});

/// Whether `text` is a complete document rather than a bare fragment.
///
/// An `<html` tag only counts outside comments, scripts and styles.
#[must_use]
pub fn has_html_root(text: &str) -> bool {
  HTML_ROOT_RE.is_match(&OPAQUE_RE.replace_all(text, ""))
}

/// Parse text into a full html5ever document tree.
#[must_use]
pub fn parse_document(text: &str) -> NodeRef {
  kuchikikiki::parse_html().one(text)
}

/// Parse text as the contents of a `<body>` element.
///
/// Unlike [`parse_document`], nothing is hoisted into a `<head>`, so comments
/// and stray `<title>`/`<meta>` tags stay where they were written.
#[must_use]
pub fn parse_fragment(text: &str) -> NodeRef {
  let context = QualName::new(None, ns!(html), local_name!("body"));
  kuchikikiki::parse_fragment(context, Vec::new()).one(text)
}

/// Serialize the nodes of a tree built by [`parse_fragment`].
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_fragment(fragment: &NodeRef) -> Result<String> {
  // Fragment nodes sit below a synthetic <html> root
  let root = fragment.first_child().unwrap_or_else(|| fragment.clone());
  let mut out = String::new();
  for child in root.children() {
    out.push_str(&serialize(&child)?);
  }
  Ok(out)
}

/// Serialize a node, including the node itself unless it is the document.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize(node: &NodeRef) -> Result<String> {
  let mut out = Vec::new();
  node.serialize(&mut out).map_err(RewriteError::Serialize)?;
  Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Normalize every `href` and `src` attribute below `root`.
///
/// Only real attributes are visited, so link-like text inside scripts,
/// styles or comments is left alone. Returns the number of values that
/// changed.
pub fn rewrite_links(root: &NodeRef, domain: &str) -> usize {
  let mut changed = 0;
  for node in root.inclusive_descendants() {
    let Some(element) = node.as_element() else {
      continue;
    };
    let mut attributes = element.attributes.borrow_mut();
    for name in LINK_ATTRIBUTES {
      let Some(value) = attributes.get(name) else {
        continue;
      };
      let normalized = links::normalize(value, domain);
      if normalized != value {
        attributes.insert(name, normalized);
        changed += 1;
      }
    }
  }
  changed
}

/// Replace every charset declaration with a single `<meta charset="utf-8">`
/// at the start of `<head>`.
pub fn unify_charset(document: &NodeRef) {
  let mut declarations = Vec::new();
  if let Ok(metas) = document.select("meta") {
    for meta in metas {
      let attributes = meta.attributes.borrow();
      let declares_charset = attributes.contains("charset")
        || attributes
          .get("http-equiv")
          .is_some_and(|v| v.trim().eq_ignore_ascii_case("content-type"));
      if declares_charset {
        declarations.push(meta.as_node().clone());
      }
    }
  }

  for node in declarations {
    node.detach();
  }

  if let Ok(head) = document.select_first("head") {
    head.as_node().prepend(charset_meta());
  }
}

fn charset_meta() -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), local_name!("meta")),
    vec![(ExpandedName::new("", "charset"), Attribute {
      prefix: None,
      value:  "utf-8".into(),
    })],
  )
}

/// Title of a parsed page: the `<title>` text, else the first `<h1>` text.
#[must_use]
pub fn extract_title(document: &NodeRef) -> Option<String> {
  ["title", "h1"].into_iter().find_map(|selector| {
    document
      .select_first(selector)
      .ok()
      .map(|element| collapse_whitespace(&element.as_node().text_contents()))
      .filter(|title| !title.is_empty())
  })
}

/// Serialize the children of a parsed fragment.
///
/// html5ever hoists some fragment content (stylesheets, scripts) into
/// `<head>`; those are kept, while `<title>` and `<meta>` are dropped since
/// the page shell provides its own.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn fragment_content(document: &NodeRef) -> Result<String> {
  let mut content = String::new();

  if let Ok(head) = document.select_first("head") {
    for child in head.as_node().children() {
      let is_replaced = child.as_element().is_some_and(|element| {
        matches!(element.name.local.as_ref(), "title" | "meta")
      });
      if !is_replaced {
        content.push_str(&serialize(&child)?);
      }
    }
  }

  if let Ok(body) = document.select_first("body") {
    for child in body.as_node().children() {
      content.push_str(&serialize(&child)?);
    }
  }

  Ok(content.trim().to_string())
}

fn collapse_whitespace(text: &str) -> String {
  text.split_whitespace().collect::<Vec<_>>().join(" ")
}
