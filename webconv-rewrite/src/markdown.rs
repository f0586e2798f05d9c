//! Markdown to HTML conversion.
use crate::{
  encoding::detect_and_decode,
  error::Result,
  html,
  page::Converted,
  site::Site,
};

/// Title used for Markdown files without a level one heading.
pub const DEFAULT_MARKDOWN_TITLE: &str = "Markdown Page";

/// Find the first line that is a level one ATX heading (`# Title`).
#[must_use]
pub fn extract_title(markdown: &str) -> Option<String> {
  markdown
    .lines()
    .filter_map(|line| line.trim_start().strip_prefix("# "))
    .map(str::trim)
    .find(|title| !title.is_empty())
    .map(ToString::to_string)
}

/// Render a Markdown file into a complete page.
///
/// The body is converted with a CommonMark renderer (tables, footnotes,
/// strikethrough, task lists, autolinks and description lists enabled),
/// its links are normalized for the site, and the result is wrapped in the
/// page shell under the extracted title.
///
/// # Errors
///
/// Returns [`RewriteError::MarkdownUnavailable`] when built without the
/// `markdown` feature, or an error if the page shell fails to render.
///
/// [`RewriteError::MarkdownUnavailable`]: crate::RewriteError::MarkdownUnavailable
pub fn render(raw: &[u8], site: &Site) -> Result<Converted> {
  let decoded = detect_and_decode(raw);
  let encoding = decoded.encoding_name();
  let lossy = decoded.is_lossy();
  let text = decoded.into_text();

  let title =
    extract_title(&text).unwrap_or_else(|| DEFAULT_MARKDOWN_TITLE.to_string());
  let fragment = to_html(&text)?;
  let content = normalize_fragment_links(&fragment, site.domain())?;

  Ok(Converted {
    html: site.render_page(&title, &content)?,
    title: Some(title),
    encoding,
    lossy,
    synthesized: true,
  })
}

fn normalize_fragment_links(fragment: &str, domain: &str) -> Result<String> {
  let nodes = html::parse_fragment(fragment);
  if html::rewrite_links(&nodes, domain) == 0 {
    return Ok(fragment.to_string());
  }
  html::serialize_fragment(&nodes)
}

#[cfg(feature = "markdown")]
#[allow(
  clippy::unnecessary_wraps,
  reason = "Signature shared with the build without Markdown support"
)]
fn to_html(markdown: &str) -> Result<String> {
  Ok(comrak::markdown_to_html(markdown, &comrak_options()))
}

#[cfg(not(feature = "markdown"))]
fn to_html(_markdown: &str) -> Result<String> {
  Err(crate::RewriteError::MarkdownUnavailable)
}

#[cfg(feature = "markdown")]
fn comrak_options() -> comrak::options::Options<'static> {
  let mut options = comrak::options::Options::default();
  options.extension.table = true;
  options.extension.footnotes = true;
  options.extension.strikethrough = true;
  options.extension.tasklist = true;
  options.extension.autolink = true;
  options.extension.description_lists = true;
  options.render.r#unsafe = true;
  options
}
