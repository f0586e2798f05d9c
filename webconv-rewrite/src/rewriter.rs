//! Content rewriter for mirrored HTML pages.
use std::path::Path;

use log::trace;

use crate::{
  encoding::detect_and_decode,
  error::Result,
  html,
  page::Converted,
  site::Site,
  utils::title_from_file_name,
};

/// Rewrite a mirrored HTML page into its final UTF-8 form.
///
/// The bytes are decoded with [`detect_and_decode`], every `href`/`src` is
/// normalized for the site's domain and all charset declarations collapse
/// into one `<meta charset="utf-8">`. A document without an `<html>` root is
/// treated as a fragment and wrapped in the page shell, titled after its
/// `<title>`, its first `<h1>`, or `source`'s file name.
///
/// # Errors
///
/// Returns an error if the result cannot be serialized or the page shell
/// fails to render.
pub fn rewrite_html(raw: &[u8], site: &Site, source: &Path) -> Result<Converted> {
  let decoded = detect_and_decode(raw);
  let encoding = decoded.encoding_name();
  let lossy = decoded.is_lossy();
  let text = decoded.into_text();

  let document = html::parse_document(&text);
  let changed = html::rewrite_links(&document, site.domain());
  trace!("Rewrote {changed} links in {}", source.display());

  let title = html::extract_title(&document);

  if html::has_html_root(&text) {
    html::unify_charset(&document);
    return Ok(Converted {
      html: html::serialize(&document)?,
      title,
      encoding,
      lossy,
      synthesized: false,
    });
  }

  let title = title.unwrap_or_else(|| title_from_file_name(source));
  let content = html::fragment_content(&document)?;

  Ok(Converted {
    html: site.render_page(&title, &content)?,
    title: Some(title),
    encoding,
    lossy,
    synthesized: true,
  })
}
