pub mod templates;

use std::{
  fs,
  path::{Path, PathBuf},
  time::Duration,
};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use webconv_rewrite::{
  ContentKind,
  site::{DEFAULT_SITE_TITLE, domain_from_url},
};

use crate::{cli::Cli, error::ConfigError};

/// Configuration files looked up in the working directory when none is given.
const DISCOVERED_CONFIG_FILES: &[&str] = &["webconv.toml", "webconv.json"];

/// Which source files get converted.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum FileTypes {
  /// Convert Markdown and HTML, copy everything else verbatim.
  All,
  /// Convert Markdown only.
  MdOnly,
  /// Convert HTML only.
  HtmlOnly,
  /// Convert Markdown and HTML.
  #[default]
  MdHtml,
}

impl FileTypes {
  /// Whether files of `kind` are written to the output.
  #[must_use]
  pub const fn accepts(self, kind: ContentKind) -> bool {
    match kind {
      ContentKind::Markdown => {
        matches!(self, Self::All | Self::MdOnly | Self::MdHtml)
      },
      ContentKind::Html => {
        matches!(self, Self::All | Self::HtmlOnly | Self::MdHtml)
      },
      ContentKind::Other => matches!(self, Self::All),
    }
  }
}

const fn default_true() -> bool {
  true
}

const fn default_port() -> u16 {
  8080
}

const fn default_depth() -> u32 {
  5
}

const fn default_timeout() -> u64 {
  3600
}

fn default_title() -> String {
  DEFAULT_SITE_TITLE.to_string()
}

fn default_lang() -> String {
  "en".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
  /// URL of the site to mirror.
  #[serde(default)]
  pub url: Option<String>,

  /// Directory httrack downloads into.
  #[serde(default)]
  pub download_dir: Option<PathBuf>,

  /// Output directory for the converted site.
  #[serde(default)]
  pub output_dir: Option<PathBuf>,

  /// Cap on the number of files processed and mirrored.
  #[serde(default)]
  pub limit: Option<usize>,

  /// Skip mirroring even when a URL is set.
  #[serde(default)]
  pub no_download: bool,

  #[serde(default)]
  pub file_types: FileTypes,

  /// httrack mirror depth.
  #[serde(default = "default_depth")]
  pub depth: u32,

  /// Extra httrack options, split on whitespace.
  #[serde(default)]
  pub httrack_options: Option<String>,

  /// Title of the generated index page.
  #[serde(default = "default_title")]
  pub title: String,

  /// Document language of generated pages.
  #[serde(default = "default_lang")]
  pub lang: String,

  /// Overall run timeout in seconds, 0 disables it.
  #[serde(default = "default_timeout")]
  pub timeout: u64,

  /// Number of conversion threads.
  #[serde(default)]
  pub jobs: Option<usize>,

  /// Directory with template overrides.
  #[serde(default)]
  pub template_dir: Option<PathBuf>,

  /// List converted Markdown pages on the index page.
  #[serde(default)]
  pub index_markdown: bool,

  /// Serve the converted site when done.
  #[serde(default)]
  pub server: bool,

  /// First port to try when serving.
  #[serde(default = "default_port")]
  pub port: u16,

  /// Open a browser when serving.
  #[serde(default = "default_true")]
  pub open_browser: bool,

  /// Enable verbose output; only settable from the command line.
  #[serde(skip)]
  pub verbose: bool,

  /// Site domain derived from `url`.
  #[serde(skip)]
  pub domain: String,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      url:             None,
      download_dir:    None,
      output_dir:      None,
      limit:           None,
      no_download:     false,
      file_types:      FileTypes::default(),
      depth:           default_depth(),
      httrack_options: None,
      title:           default_title(),
      lang:            default_lang(),
      timeout:         default_timeout(),
      jobs:            None,
      template_dir:    None,
      index_markdown:  false,
      server:          false,
      port:            default_port(),
      open_browser:    default_true(),
      verbose:         false,
      domain:          String::new(),
    }
  }
}

impl Config {
  /// Create a new configuration from a file.
  /// Only TOML and JSON are supported.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| {
      ConfigError::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;

    let Some(ext) = path.extension() else {
      return Err(ConfigError::MissingExtension(path.to_path_buf()));
    };

    match ext.to_string_lossy().to_lowercase().as_str() {
      "json" => Ok(serde_json::from_str(&content)?),
      "toml" => Ok(toml::from_str(&content)?),
      other => Err(ConfigError::UnsupportedFormat(other.to_string())),
    }
  }

  /// Load config from file and CLI arguments, then derive the site domain
  /// and directories.
  ///
  /// # Errors
  ///
  /// Returns an error if the config file is invalid, the URL cannot be
  /// parsed, or there is nothing to convert.
  pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
    let mut config = if let Some(config_path) = &cli.config_file {
      Self::from_file(config_path)?
    } else if let Some(discovered) = Self::find_config_file() {
      log::info!("Using discovered config file: {}", discovered.display());
      Self::from_file(&discovered)?
    } else {
      Self::default()
    };

    config.merge_with_cli(cli);
    config.resolve()?;
    config.validate()?;
    Ok(config)
  }

  /// Merge CLI arguments into this config, prioritizing CLI values when
  /// present.
  pub fn merge_with_cli(&mut self, cli: &Cli) {
    if let Some(url) = &cli.url {
      self.url = Some(url.clone());
    }
    if let Some(output) = &cli.output {
      self.output_dir = Some(output.clone());
    }
    if let Some(download_dir) = &cli.download_dir {
      self.download_dir = Some(download_dir.clone());
    }
    if let Some(limit) = cli.limit {
      self.limit = Some(limit);
    }
    if let Some(file_types) = cli.file_types {
      self.file_types = file_types;
    }
    if let Some(port) = cli.port {
      self.port = port;
    }
    if let Some(depth) = cli.depth {
      self.depth = depth;
    }
    if let Some(options) = &cli.httrack_options {
      self.httrack_options = Some(options.clone());
    }
    if let Some(title) = &cli.title {
      self.title.clone_from(title);
    }
    if let Some(timeout) = cli.timeout {
      self.timeout = timeout;
    }
    if let Some(jobs) = cli.jobs {
      self.jobs = Some(jobs);
    }
    if let Some(template_dir) = &cli.template_dir {
      self.template_dir = Some(template_dir.clone());
    }
    if let Some(lang) = &cli.lang {
      self.lang.clone_from(lang);
    }

    // Flags can only switch behavior on
    self.no_download |= cli.no_download;
    self.server |= cli.server;
    self.index_markdown |= cli.index_markdown;
    self.verbose |= cli.verbose;
    if cli.no_open {
      self.open_browser = false;
    }
  }

  /// Derive the site domain from the configured URL.
  ///
  /// # Errors
  ///
  /// Returns an error if the URL cannot be parsed.
  pub fn resolve(&mut self) -> Result<(), ConfigError> {
    self.domain = domain_from_url(self.url.as_deref())?;
    Ok(())
  }

  fn validate(&self) -> Result<(), ConfigError> {
    if self.server && self.port == 0 {
      return Err(ConfigError::InvalidPort);
    }

    let download_root = self.download_root();
    if !self.should_mirror() && !download_root.is_dir() {
      return Err(ConfigError::MissingDownloadDir(download_root));
    }

    Ok(())
  }

  /// Look for a configuration file in the working directory.
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    DISCOVERED_CONFIG_FILES
      .iter()
      .map(PathBuf::from)
      .find(|path| path.is_file())
  }

  /// Whether the run starts by mirroring the configured URL.
  #[must_use]
  pub const fn should_mirror(&self) -> bool {
    self.url.is_some() && !self.no_download
  }

  /// Directory holding the mirrored site.
  #[must_use]
  pub fn download_root(&self) -> PathBuf {
    self
      .download_dir
      .clone()
      .unwrap_or_else(|| PathBuf::from(format!("{}_httrack", self.domain)))
  }

  /// Directory the converted site is written to.
  #[must_use]
  pub fn output_root(&self) -> PathBuf {
    self
      .output_dir
      .clone()
      .unwrap_or_else(|| PathBuf::from(format!("{}_html", self.domain)))
  }

  /// Extra httrack options, split on whitespace.
  #[must_use]
  pub fn extra_mirror_options(&self) -> Vec<String> {
    self
      .httrack_options
      .as_deref()
      .map(|options| options.split_whitespace().map(String::from).collect())
      .unwrap_or_default()
  }

  /// Worker thread count for file conversion.
  #[must_use]
  pub fn thread_count(&self) -> usize {
    self
      .jobs
      .filter(|jobs| *jobs > 0)
      .unwrap_or_else(num_cpus::get)
  }

  /// The overall run timeout, if enabled.
  #[must_use]
  pub const fn timeout_duration(&self) -> Option<Duration> {
    if self.timeout == 0 {
      None
    } else {
      Some(Duration::from_secs(self.timeout))
    }
  }

  /// Generate a default configuration file with commented explanations.
  ///
  /// # Errors
  ///
  /// Returns an error for unknown formats or if the file cannot be written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = templates::get_template(format)?;

    fs::write(path, config_content).map_err(|source| {
      ConfigError::Write {
        path: path.to_path_buf(),
        source,
      }
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// Export embedded templates to a directory for customization.
  ///
  /// # Errors
  ///
  /// Returns an error if the directory or a template file cannot be written.
  pub fn export_templates(
    output_dir: &Path,
    force: bool,
  ) -> Result<(), ConfigError> {
    fs::create_dir_all(output_dir).map_err(|source| {
      ConfigError::Write {
        path: output_dir.to_path_buf(),
        source,
      }
    })?;

    let mut templates: Vec<_> =
      webconv_templates::all_templates().into_iter().collect();
    templates.sort_unstable_by_key(|(name, _)| *name);

    for (filename, content) in templates {
      let file_path = output_dir.join(filename);

      if file_path.exists() && !force {
        log::warn!(
          "Skipping existing file: {} (use --force to overwrite)",
          file_path.display()
        );
        continue;
      }

      fs::write(&file_path, content).map_err(|source| {
        ConfigError::Write {
          path: file_path.clone(),
          source,
        }
      })?;

      log::info!("Exported template: {}", file_path.display());
    }

    log::info!("Templates exported to: {}", output_dir.display());
    log::info!(
      "Use --template-dir {} to customize the generated pages",
      output_dir.display()
    );
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]

  use super::*;

  #[test]
  fn test_file_types_accepts() {
    assert!(FileTypes::MdHtml.accepts(ContentKind::Markdown));
    assert!(FileTypes::MdHtml.accepts(ContentKind::Html));
    assert!(!FileTypes::MdHtml.accepts(ContentKind::Other));
    assert!(!FileTypes::MdOnly.accepts(ContentKind::Html));
    assert!(!FileTypes::HtmlOnly.accepts(ContentKind::Markdown));
    assert!(FileTypes::All.accepts(ContentKind::Other));
  }

  #[test]
  fn test_default_templates_parse() {
    let from_toml: Config = toml::from_str(templates::DEFAULT_TOML_TEMPLATE)
      .unwrap();
    let from_json: Config =
      serde_json::from_str(templates::DEFAULT_JSON_TEMPLATE).unwrap();

    for config in [from_toml, from_json] {
      assert_eq!(config.file_types, FileTypes::MdHtml);
      assert_eq!(config.port, 8080);
      assert_eq!(config.depth, 5);
      assert_eq!(config.timeout, 3600);
      assert_eq!(config.title, DEFAULT_SITE_TITLE);
      assert!(config.open_browser);
    }
  }

  #[test]
  fn test_unknown_format_is_rejected() {
    assert!(matches!(
      templates::get_template("yaml"),
      Err(ConfigError::UnsupportedFormat(_))
    ));
  }

  #[test]
  fn test_derived_directories() {
    let mut config = Config {
      url: Some("https://docs.example.com/start".to_string()),
      ..Config::default()
    };
    config.resolve().unwrap();

    assert_eq!(config.domain, "docs.example.com");
    assert_eq!(config.download_root(), Path::new("docs.example.com_httrack"));
    assert_eq!(config.output_root(), Path::new("docs.example.com_html"));
    assert!(config.should_mirror());

    config.no_download = true;
    assert!(!config.should_mirror());
  }

  #[test]
  fn test_timeout_zero_disables() {
    let config = Config {
      timeout: 0,
      ..Config::default()
    };
    assert_eq!(config.timeout_duration(), None);
    assert_eq!(
      Config::default().timeout_duration(),
      Some(Duration::from_secs(3600))
    );
  }

  #[test]
  fn test_extra_mirror_options() {
    let config = Config {
      httrack_options: Some("  -s0   --robots=0 ".to_string()),
      ..Config::default()
    };
    assert_eq!(config.extra_mirror_options(), ["-s0", "--robots=0"]);
  }
}
