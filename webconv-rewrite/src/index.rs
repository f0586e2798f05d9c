//! Site indexer: the categorized landing page and the root redirect.
use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::{
  encoding::detect_and_decode,
  error::{Result, RewriteError},
  html,
  markdown,
  page::{ContentKind, Page},
  site::{CategoryCard, PageLink, Site},
  utils::{title_from_file_name, to_web_path},
};

/// Category for pages sitting directly in the download root.
pub const DEFAULT_CATEGORY: &str = "uncategorized";

/// Category of the placeholder entry written when no pages exist.
pub const PLACEHOLDER_CATEGORY: &str = "test";

const PLACEHOLDER_TITLE: &str = "Test article";
const PLACEHOLDER_FILE: &str = "test-article.html";

/// Tunables for index generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexOptions {
  /// Also list Markdown sources (under their converted `.html` path).
  pub include_markdown: bool,
}

/// What [`build_index`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
  pub pages:       usize,
  pub categories:  usize,
  /// Whether the index only holds the placeholder entry.
  pub placeholder: bool,
  /// Path of the categorized index page.
  pub index_path:  PathBuf,
}

/// Grouping key for a page: its first path segment, or
/// [`DEFAULT_CATEGORY`] for pages at the root.
#[must_use]
pub fn category_of(rel_path: &Path) -> String {
  let mut components = rel_path.components();
  match (components.next(), components.next()) {
    (Some(first), Some(_)) => first.as_os_str().to_string_lossy().into_owned(),
    _ => DEFAULT_CATEGORY.to_string(),
  }
}

/// Walk `download_root` and group the pages to be listed by category.
///
/// Categories are ordered by name and pages within a category by title.
/// Files named `index.html` are never listed.
///
/// # Errors
///
/// Returns an error if the walk fails at the root itself.
pub fn collect_categories(
  download_root: &Path,
  domain: &str,
  options: IndexOptions,
) -> Result<Vec<CategoryCard>> {
  let mut categories: BTreeMap<String, Vec<PageLink>> = BTreeMap::new();

  if !download_root.exists() {
    warn!("Download directory {} does not exist", download_root.display());
    return Ok(Vec::new());
  }

  for entry in WalkDir::new(download_root).sort_by_file_name() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) if e.depth() == 0 => return Err(RewriteError::Walk(e)),
      Err(e) => {
        warn!("Skipping unreadable entry: {e}");
        continue;
      },
    };
    if !entry.file_type().is_file() || entry.file_name() == "index.html" {
      continue;
    }

    let Some(page) = Page::discover(download_root, entry.path()) else {
      continue;
    };
    let listed = match page.kind {
      ContentKind::Html => true,
      ContentKind::Markdown => options.include_markdown,
      ContentKind::Other => false,
    };
    if !listed {
      continue;
    }

    let title = page_title(&page);
    let category = category_of(&page.rel_path);
    let path = format!("/{domain}/{}", to_web_path(&page.output_rel_path()));
    debug!(
      "Found page: {} -> {title} [category: {category}]",
      page.rel_path.display()
    );

    categories
      .entry(category)
      .or_default()
      .push(PageLink { path, title });
  }

  Ok(
    categories
      .into_iter()
      .map(|(name, mut pages)| {
        pages.sort_by(|a, b| a.title.cmp(&b.title));
        CategoryCard { name, pages }
      })
      .collect(),
  )
}

/// Title of a source page. Read failures fall back to the file name.
fn page_title(page: &Page) -> String {
  let raw = match fs::read(&page.source) {
    Ok(raw) => raw,
    Err(e) => {
      warn!("Failed to read title from {}: {e}", page.rel_path.display());
      return title_from_file_name(&page.rel_path);
    },
  };
  let text = detect_and_decode(&raw).into_text();

  let title = match page.kind {
    ContentKind::Markdown => markdown::extract_title(&text),
    _ => html::extract_title(&html::parse_document(&text)),
  };
  title.unwrap_or_else(|| title_from_file_name(&page.rel_path))
}

fn placeholder(domain: &str) -> CategoryCard {
  CategoryCard {
    name:  PLACEHOLDER_CATEGORY.to_string(),
    pages: vec![PageLink {
      path:  format!("/{domain}/{PLACEHOLDER_FILE}"),
      title: PLACEHOLDER_TITLE.to_string(),
    }],
  }
}

/// Build `<output_root>/<domain>/index.html` from the pages found under
/// `download_root`, plus a redirect to it at `<output_root>/index.html`.
///
/// When no pages are found a single placeholder entry is listed under
/// [`PLACEHOLDER_CATEGORY`] and the page says so.
///
/// # Errors
///
/// Returns an error if walking, rendering or writing fails.
pub fn build_index(
  download_root: &Path,
  output_root: &Path,
  site: &Site,
  options: IndexOptions,
) -> Result<IndexSummary> {
  info!("Scanning {} for pages", download_root.display());
  let mut categories =
    collect_categories(download_root, site.domain(), options)?;

  let placeholder_used = categories.is_empty();
  if placeholder_used {
    warn!("No pages found, listing a placeholder entry");
    categories.push(placeholder(site.domain()));
  }

  let generated_at = jiff::Zoned::now()
    .strftime("%Y-%m-%d %H:%M:%S")
    .to_string();
  let index_html =
    site.render_index(&categories, placeholder_used, &generated_at)?;

  let site_dir = output_root.join(site.domain());
  fs::create_dir_all(&site_dir).map_err(|e| RewriteError::io(&site_dir, e))?;

  let index_path = site_dir.join("index.html");
  fs::write(&index_path, index_html)
    .map_err(|e| RewriteError::io(&index_path, e))?;

  let redirect_path = output_root.join("index.html");
  fs::write(&redirect_path, site.render_redirect()?)
    .map_err(|e| RewriteError::io(&redirect_path, e))?;

  let summary = IndexSummary {
    pages: categories.iter().map(|c| c.pages.len()).sum(),
    categories: categories.len(),
    placeholder: placeholder_used,
    index_path,
  };
  info!(
    "Index lists {} pages in {} categories",
    summary.pages, summary.categories
  );
  Ok(summary)
}
