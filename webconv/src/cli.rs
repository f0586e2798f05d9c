use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::FileTypes;

/// Command line interface for webconv
#[derive(Parser, Debug, Default)]
#[command(
  author,
  version,
  about = "Mirror a website and convert it into a browsable offline copy"
)]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Option<Commands>,

  /// URL of the site to mirror. Without it an existing download directory is
  /// converted.
  #[arg(short, long)]
  pub url: Option<String>,

  /// Output directory for the converted site [default: <domain>_html]
  #[arg(short, long)]
  pub output: Option<PathBuf>,

  /// Directory the mirror is downloaded into [default: <domain>_httrack]
  #[arg(short, long)]
  pub download_dir: Option<PathBuf>,

  /// Only process this many files (also caps the mirror), for testing
  #[arg(short, long)]
  pub limit: Option<usize>,

  /// Skip mirroring and convert the existing download directory
  #[arg(long)]
  pub no_download: bool,

  /// Serve the converted site over HTTP when done
  #[arg(long)]
  pub server: bool,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Which file types to convert [default: md-html]
  #[arg(long, value_enum)]
  pub file_types: Option<FileTypes>,

  /// First port to try when serving [default: 8080]
  #[arg(short, long)]
  pub port: Option<u16>,

  /// Mirror depth passed to httrack [default: 5]
  #[arg(long)]
  pub depth: Option<u32>,

  /// Extra options passed to httrack, split on whitespace
  #[arg(long, allow_hyphen_values = true)]
  pub httrack_options: Option<String>,

  /// Site title shown on the index page [default: "Offline Mirror"]
  #[arg(long)]
  pub title: Option<String>,

  /// Abort the run after this many seconds, 0 disables [default: 3600]
  #[arg(short, long)]
  pub timeout: Option<u64>,

  /// Path to a configuration file (TOML or JSON)
  #[arg(short = 'c', long = "config-file")]
  pub config_file: Option<PathBuf>,

  /// Number of threads used to convert files [default: number of CPUs]
  #[arg(short, long)]
  pub jobs: Option<usize>,

  /// Directory with templates overriding the built-in ones
  #[arg(long)]
  pub template_dir: Option<PathBuf>,

  /// Document language of generated pages [default: en]
  #[arg(long)]
  pub lang: Option<String>,

  /// Do not open a browser when serving
  #[arg(long)]
  pub no_open: bool,

  /// Also list converted Markdown pages on the index page
  #[arg(long)]
  pub index_markdown: bool,
}

/// All supported subcommands for the webconv CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Write a default configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "webconv.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Export the built-in templates and stylesheet for customization.
  ExportTemplates {
    /// Output directory for template files.
    #[arg(short, long, default_value = "templates")]
    output_dir: PathBuf,

    /// Whether to overwrite existing files.
    #[arg(long)]
    force: bool,
  },
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Tests can unwrap")]

  use clap::CommandFactory;

  use super::*;

  #[test]
  fn test_cli_is_well_formed() {
    Cli::command().debug_assert();
  }

  #[test]
  fn test_parse_flags() {
    let cli = Cli::try_parse_from([
      "webconv",
      "-u",
      "https://example.com",
      "--file-types",
      "html-only",
      "--httrack-options",
      "-s0 --robots=0",
      "-t",
      "0",
      "--no-open",
    ])
    .unwrap();

    assert_eq!(cli.url.as_deref(), Some("https://example.com"));
    assert_eq!(cli.file_types, Some(FileTypes::HtmlOnly));
    assert_eq!(cli.httrack_options.as_deref(), Some("-s0 --robots=0"));
    assert_eq!(cli.timeout, Some(0));
    assert!(cli.no_open);
    assert!(cli.command.is_none());
  }

  #[test]
  fn test_parse_init() {
    let cli =
      Cli::try_parse_from(["webconv", "init", "-F", "json", "--force"]).unwrap();
    assert!(matches!(
      cli.command,
      Some(Commands::Init { ref format, force: true, .. }) if format == "json"
    ));
  }
}
