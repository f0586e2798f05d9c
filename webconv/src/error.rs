use std::{io, path::PathBuf, process::ExitStatus};

use thiserror::Error;
use webconv_rewrite::RewriteError;

/// Errors raised while assembling the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Failed to read config file {}: {source}", path.display())]
  Read {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to write {}: {source}", path.display())]
  Write {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("Failed to parse TOML config: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("Failed to parse JSON config: {0}")]
  Json(#[from] serde_json::Error),

  #[error("Unsupported config format: {0}")]
  UnsupportedFormat(String),

  #[error("Config file has no extension: {}", .0.display())]
  MissingExtension(PathBuf),

  #[error(transparent)]
  Site(#[from] RewriteError),

  #[error(
    "Download directory does not exist: {}. Pass --url to mirror a site first.",
    .0.display()
  )]
  MissingDownloadDir(PathBuf),

  #[error("Port must be non-zero")]
  InvalidPort,
}

/// Errors raised by the mirroring step.
#[derive(Debug, Error)]
pub enum MirrorError {
  #[error(
    "httrack is not installed. Install it first:\n  Linux:   sudo apt-get \
     install httrack\n  macOS:   brew install httrack\n  Windows: \
     http://www.httrack.com/page/2/"
  )]
  NotInstalled,

  #[error("Failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source:  io::Error,
  },

  #[error("Failed to read mirror output: {0}")]
  Output(#[from] io::Error),

  #[error("Mirror exited with {0}")]
  Failed(ExitStatus),
}
