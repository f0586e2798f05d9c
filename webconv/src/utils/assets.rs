use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result};
use log::debug;
use webconv_rewrite::Site;

/// Directory, relative to the site root, holding generated assets.
pub const STATIC_DIR: &str = "static";

/// Write the site stylesheet to `<output_root>/<domain>/static/index.css`.
///
/// The stylesheet is the built-in one unless the template directory
/// overrides it.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be written.
pub fn write_stylesheet(output_root: &Path, site: &Site) -> Result<()> {
  let static_dir = output_root.join(site.domain()).join(STATIC_DIR);
  fs::create_dir_all(&static_dir).wrap_err_with(|| {
    format!("Failed to create asset directory: {}", static_dir.display())
  })?;

  let css_path = static_dir.join(webconv_templates::STYLESHEET_NAME);
  fs::write(&css_path, site.stylesheet()).wrap_err_with(|| {
    format!("Failed to write stylesheet: {}", css_path.display())
  })?;

  debug!("Wrote stylesheet to {}", css_path.display());
  Ok(())
}
