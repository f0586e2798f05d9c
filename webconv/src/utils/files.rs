//! Per-file conversion of the mirrored tree.
use std::{
  collections::HashSet,
  fs,
  path::Path,
  sync::atomic::{AtomicUsize, Ordering},
};

use color_eyre::eyre::{Context, Result};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use walkdir::WalkDir;
use webconv_rewrite::{
  ContentKind,
  Converted,
  Page,
  RewriteError,
  Site,
  markdown,
  rewrite_html,
};

use crate::config::{Config, FileTypes};

/// What happened to a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
  /// Converted to HTML; `lossy` when undecodable bytes were replaced.
  Converted { lossy: bool },
  /// Copied verbatim.
  Copied,
  /// Filtered out by the file-type setting.
  Skipped,
}

/// Totals of a processing run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
  pub total:     usize,
  pub converted: usize,
  pub copied:    usize,
  pub skipped:   usize,
  pub failed:    usize,
  pub lossy:     usize,
}

#[derive(Debug, Default)]
struct Counters {
  done:      AtomicUsize,
  converted: AtomicUsize,
  copied:    AtomicUsize,
  skipped:   AtomicUsize,
  failed:    AtomicUsize,
  lossy:     AtomicUsize,
}

impl Counters {
  fn record(&self, outcome: &std::result::Result<Outcome, RewriteError>) {
    let counter = match outcome {
      Ok(Outcome::Converted { lossy }) => {
        if *lossy {
          self.lossy.fetch_add(1, Ordering::Relaxed);
        }
        &self.converted
      },
      Ok(Outcome::Copied) => &self.copied,
      Ok(Outcome::Skipped) => &self.skipped,
      Err(_) => &self.failed,
    };
    counter.fetch_add(1, Ordering::Relaxed);
  }

  fn summary(&self, total: usize) -> ProcessSummary {
    ProcessSummary {
      total,
      converted: self.converted.load(Ordering::Relaxed),
      copied: self.copied.load(Ordering::Relaxed),
      skipped: self.skipped.load(Ordering::Relaxed),
      failed: self.failed.load(Ordering::Relaxed),
      lossy: self.lossy.load(Ordering::Relaxed),
    }
  }
}

/// Collect every file below `download_root`, sorted by path, keeping at most
/// `limit` of them.
///
/// # Errors
///
/// Returns an error if the download root cannot be read.
pub fn collect_pages(
  download_root: &Path,
  limit: Option<usize>,
) -> std::result::Result<Vec<Page>, RewriteError> {
  let mut pages = Vec::new();

  for entry in WalkDir::new(download_root).sort_by_file_name() {
    let entry = match entry {
      Ok(entry) => entry,
      Err(e) if e.depth() == 0 => return Err(RewriteError::Walk(e)),
      Err(e) => {
        warn!("Skipping unreadable entry: {e}");
        continue;
      },
    };
    if !entry.file_type().is_file() {
      continue;
    }
    if let Some(page) = Page::discover(download_root, entry.path()) {
      pages.push(page);
    }
  }

  if let Some(limit) = limit
    && pages.len() > limit
  {
    info!("Limiting processing to {limit} of {} files", pages.len());
    pages.truncate(limit);
  }

  Ok(pages)
}

/// Drop pages whose output file was already claimed by an earlier page.
///
/// `a.html` and `a.md` both become `a.html`; the first one in sorted order
/// wins. Pages filtered out by `file_types` never claim a target. Returns the
/// kept pages and the number dropped.
pub fn drop_colliding(
  pages: Vec<Page>,
  file_types: FileTypes,
) -> (Vec<Page>, usize) {
  let mut claimed = HashSet::new();
  let mut dropped = 0;
  let kept = pages
    .into_iter()
    .filter(|page| {
      if !file_types.accepts(page.kind) {
        return true;
      }
      let target = page.output_rel_path();
      if claimed.contains(&target) {
        warn!(
          "Skipping {}: {} is already produced by another file",
          page.rel_path.display(),
          target.display()
        );
        dropped += 1;
        return false;
      }
      claimed.insert(target);
      true
    })
    .collect();
  (kept, dropped)
}

/// Convert, copy or skip a single page.
///
/// # Errors
///
/// Returns an error if the page cannot be read, converted or written.
pub fn process_page(
  page: &Page,
  output_root: &Path,
  site: &Site,
  file_types: FileTypes,
) -> std::result::Result<Outcome, RewriteError> {
  if !file_types.accepts(page.kind) {
    return Ok(Outcome::Skipped);
  }

  let target = page.target_path(output_root, site.domain());
  if let Some(parent) = target.parent() {
    fs::create_dir_all(parent).map_err(|e| RewriteError::io(parent, e))?;
  }

  let converted: Converted = match page.kind {
    ContentKind::Other => {
      fs::copy(&page.source, &target)
        .map_err(|e| RewriteError::io(&page.source, e))?;
      return Ok(Outcome::Copied);
    },
    ContentKind::Markdown => markdown::render(&read(page)?, site)?,
    ContentKind::Html => rewrite_html(&read(page)?, site, &page.rel_path)?,
  };

  if converted.lossy {
    warn!(
      "{}: no encoding decoded cleanly, undecodable bytes were replaced",
      page.rel_path.display()
    );
  }

  fs::write(&target, &converted.html)
    .map_err(|e| RewriteError::io(&target, e))?;

  Ok(Outcome::Converted {
    lossy: converted.lossy,
  })
}

fn read(page: &Page) -> std::result::Result<Vec<u8>, RewriteError> {
  fs::read(&page.source).map_err(|e| RewriteError::io(&page.source, e))
}

fn action_label(kind: ContentKind) -> &'static str {
  match kind {
    ContentKind::Markdown => "Rendering Markdown",
    ContentKind::Html => "Rewriting HTML",
    ContentKind::Other => "Copying",
  }
}

fn progress_bar(total: usize, verbose: bool) -> ProgressBar {
  if verbose {
    return ProgressBar::hidden();
  }
  let style = ProgressStyle::with_template(
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} \
     files ({per_sec})",
  )
  .map_or_else(|_| ProgressStyle::default_bar(), |style| {
    style.progress_chars("#>-")
  });
  ProgressBar::new(total as u64).with_style(style)
}

/// Process every file of the mirrored tree on a worker pool.
///
/// Failures are logged with the file's relative path and counted; they never
/// abort the run.
///
/// # Errors
///
/// Returns an error if the download root cannot be walked or the worker
/// pool cannot be created.
pub fn process_files(config: &Config, site: &Site) -> Result<ProcessSummary> {
  let download_root = config.download_root();
  let output_root = config.output_root();

  info!("Scanning {}", download_root.display());
  let pages = collect_pages(&download_root, config.limit).wrap_err_with(|| {
    format!("Failed to scan download directory {}", download_root.display())
  })?;
  let found = pages.len();
  info!("Found {found} files to process");
  let (pages, shadowed) = drop_colliding(pages, config.file_types);
  let total = pages.len();

  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(config.thread_count())
    .build()
    .wrap_err("Failed to create worker pool")?;

  let counters = Counters::default();
  counters.skipped.fetch_add(shadowed, Ordering::Relaxed);
  let bar = progress_bar(total, config.verbose);

  pool.install(|| {
    pages
      .par_iter()
      .progress_with(bar.clone())
      .for_each(|page| {
        let index = counters.done.fetch_add(1, Ordering::Relaxed) + 1;
        if config.file_types.accepts(page.kind) {
          debug!(
            "[{index}/{total}] {}: {}",
            action_label(page.kind),
            page.rel_path.display()
          );
        }

        let outcome =
          process_page(page, &output_root, site, config.file_types);
        if let Err(e) = &outcome {
          error!("Failed to process {}: {e}", page.rel_path.display());
        }
        counters.record(&outcome);
      });
  });
  bar.finish_and_clear();

  let summary = counters.summary(found);
  info!(
    "Processed {found} files: {} converted, {} copied, {} skipped, {} failed",
    summary.converted, summary.copied, summary.skipped, summary.failed
  );
  if summary.lossy > 0 {
    warn!(
      "{} files contained bytes no candidate encoding could decode",
      summary.lossy
    );
  }

  Ok(summary)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]

  use super::*;

  fn tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/a.md"), "# A").unwrap();
    fs::write(dir.path().join("docs/b.html"), "<p>b</p>").unwrap();
    fs::write(dir.path().join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
    dir
  }

  #[test]
  fn test_collect_pages_sorted_and_limited() {
    let dir = tree();
    let all = collect_pages(dir.path(), None).unwrap();
    let names: Vec<_> = all
      .iter()
      .map(|p| p.rel_path.to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, ["docs/a.md", "docs/b.html", "logo.png"]);

    assert_eq!(collect_pages(dir.path(), Some(2)).unwrap().len(), 2);
  }

  #[test]
  fn test_colliding_targets_keep_first_source() {
    let dir = tree();
    fs::write(dir.path().join("docs/a.html"), "<p>html a</p>").unwrap();
    let pages = collect_pages(dir.path(), None).unwrap();
    assert_eq!(pages.len(), 4);

    let (kept, dropped) = drop_colliding(pages.clone(), FileTypes::MdHtml);
    assert_eq!(dropped, 1);
    let names: Vec<_> = kept
      .iter()
      .map(|p| p.rel_path.to_string_lossy().into_owned())
      .collect();
    assert_eq!(names, ["docs/a.html", "docs/b.html", "logo.png"]);

    // The HTML copy is filtered out, so the Markdown source is kept
    let (kept, dropped) = drop_colliding(pages, FileTypes::MdOnly);
    assert_eq!(dropped, 0);
    assert_eq!(kept.len(), 4);
  }

  #[test]
  fn test_process_page_by_file_type() {
    let dir = tree();
    let out = tempfile::tempdir().unwrap();
    let site = Site::new("d").unwrap();
    let pages = collect_pages(dir.path(), None).unwrap();

    let outcomes: Vec<_> = pages
      .iter()
      .map(|p| process_page(p, out.path(), &site, FileTypes::MdOnly).unwrap())
      .collect();
    assert_eq!(outcomes, [
      Outcome::Converted { lossy: false },
      Outcome::Skipped,
      Outcome::Skipped
    ]);
    assert!(out.path().join("d/docs/a.html").exists());
    assert!(!out.path().join("d/docs/b.html").exists());

    let copied =
      process_page(&pages[2], out.path(), &site, FileTypes::All).unwrap();
    assert_eq!(copied, Outcome::Copied);
    assert_eq!(
      fs::read(out.path().join("d/logo.png")).unwrap(),
      [0x89, b'P', b'N', b'G']
    );
  }
}
