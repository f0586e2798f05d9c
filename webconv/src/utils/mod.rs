pub mod assets;
pub mod files;

use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result, bail};
use log::info;
use webconv_rewrite::{IndexOptions, IndexSummary, Site, build_index};

pub use crate::utils::{
  assets::write_stylesheet,
  files::{ProcessSummary, process_files},
};
use crate::config::Config;

/// Result of a full conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
  pub files: ProcessSummary,
  pub index: IndexSummary,
}

/// Build the [`Site`] described by `config`.
///
/// # Errors
///
/// Returns an error if the domain is invalid or a template override fails
/// to load.
pub fn site_from_config(config: &Config) -> Result<Site> {
  let mut site = Site::new(config.domain.clone())?
    .with_title(config.title.clone())
    .with_lang(config.lang.clone());

  if let Some(dir) = &config.template_dir {
    site = site.with_template_dir(dir).wrap_err_with(|| {
      format!("Failed to load templates from {}", dir.display())
    })?;
  }

  Ok(site)
}

/// Remove and recreate the output root, then write the site's static assets.
///
/// # Errors
///
/// Returns an error if the output root would contain the download root, or
/// if any directory or asset cannot be written.
pub fn prepare_output(
  output_root: &Path,
  download_root: &Path,
  site: &Site,
) -> Result<()> {
  if output_root.exists() {
    let output = output_root.canonicalize()?;
    if download_root
      .canonicalize()
      .is_ok_and(|download| download.starts_with(&output))
    {
      bail!(
        "Refusing to clear {}: it contains the download directory {}",
        output_root.display(),
        download_root.display()
      );
    }

    info!("Clearing output directory {}", output_root.display());
    fs::remove_dir_all(output_root).wrap_err_with(|| {
      format!("Failed to clear output directory: {}", output_root.display())
    })?;
  }

  fs::create_dir_all(output_root).wrap_err_with(|| {
    format!("Failed to create output directory: {}", output_root.display())
  })?;

  write_stylesheet(output_root, site)
}

/// Convert the download directory into the output site: prepare the output,
/// process every file, then build the index.
///
/// # Errors
///
/// Returns an error on fatal setup failures. Per-file failures are only
/// counted.
pub fn convert_site(config: &Config) -> Result<ConversionReport> {
  let site = site_from_config(config)?;
  let download_root = config.download_root();
  let output_root = config.output_root();

  info!("Site domain: {}", site.domain());
  info!("Download directory: {}", download_root.display());
  info!("Output directory: {}", output_root.display());

  prepare_output(&output_root, &download_root, &site)?;

  let files = process_files(config, &site)?;

  let index = build_index(&download_root, &output_root, &site, IndexOptions {
    include_markdown: config.index_markdown,
  })
  .wrap_err("Failed to build the index page")?;

  info!("Site written to {}", output_root.display());
  Ok(ConversionReport { files, index })
}
