//! The external site mirror (httrack).
use std::{path::PathBuf, process::Stdio};

use log::{debug, info};
use tokio::{
  io::{AsyncBufReadExt, AsyncRead, BufReader},
  process::Command,
};
use webconv_rewrite::encoding::{CONSOLE_CANDIDATES, Detector};

use crate::{config::Config, error::MirrorError};

/// Name of the mirroring program.
pub const HTTRACK: &str = "httrack";

/// Per-request timeout passed to httrack when a file limit is set.
const LIMITED_RUN_TIMEOUT_SECS: u32 = 60;

/// One invocation of the site mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorCommand {
  pub program: String,
  pub url:     String,
  pub path:    PathBuf,
  pub depth:   u32,
  pub limit:   Option<usize>,
  pub extra:   Vec<String>,
}

impl MirrorCommand {
  /// Build the mirror invocation for `config`, or `None` when the run does
  /// not mirror anything.
  #[must_use]
  pub fn from_config(config: &Config) -> Option<Self> {
    if !config.should_mirror() {
      return None;
    }
    let url = config.url.clone()?;
    Some(Self {
      program: HTTRACK.to_string(),
      url,
      path: config.download_root(),
      depth: config.depth,
      limit: config.limit,
      extra: config.extra_mirror_options(),
    })
  }

  /// Command line arguments, without the program name.
  #[must_use]
  pub fn args(&self) -> Vec<String> {
    let mut args = vec![
      self.url.clone(),
      "--path".to_string(),
      self.path.display().to_string(),
      "--depth".to_string(),
      self.depth.to_string(),
      "--quiet".to_string(),
      "--display".to_string(),
    ];

    if let Some(limit) = self.limit {
      args.extend([
        "--max-files".to_string(),
        limit.to_string(),
        "--timeout".to_string(),
        LIMITED_RUN_TIMEOUT_SECS.to_string(),
      ]);
    }

    args.extend(self.extra.iter().cloned());
    args
  }

  /// Whether the program can be run at all.
  pub async fn is_installed(&self) -> bool {
    Command::new(&self.program)
      .arg("--version")
      .stdin(Stdio::null())
      .stdout(Stdio::null())
      .stderr(Stdio::null())
      .kill_on_drop(true)
      .status()
      .await
      .is_ok_and(|status| status.success())
  }

  /// Run the mirror, echoing its output through the logger.
  ///
  /// The child is killed if the returned future is dropped, so a timeout or
  /// cancellation racing this call also stops the download.
  ///
  /// # Errors
  ///
  /// Returns an error if the program is missing, cannot be started, or
  /// exits unsuccessfully.
  pub async fn run(&self) -> Result<(), MirrorError> {
    if !self.is_installed().await {
      return Err(MirrorError::NotInstalled);
    }

    info!("Mirroring {} into {}", self.url, self.path.display());
    info!("Mirror depth: {}", self.depth);
    if let Some(limit) = self.limit {
      info!("Limiting the mirror to {limit} files");
    }

    let args = self.args();
    debug!("Running {} {}", self.program, args.join(" "));

    let mut child = Command::new(&self.program)
      .args(&args)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(|source| {
        MirrorError::Spawn {
          program: self.program.clone(),
          source,
        }
      })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (out, err, status) = tokio::join!(
      echo_lines(stdout),
      echo_lines(stderr),
      child.wait()
    );
    out?;
    err?;
    let status = status?;

    if status.success() {
      info!("Mirror complete");
      Ok(())
    } else {
      Err(MirrorError::Failed(status))
    }
  }
}

/// Log every line of `reader`, decoding each one defensively.
async fn echo_lines<R>(reader: Option<R>) -> std::io::Result<()>
where
  R: AsyncRead + Unpin,
{
  let Some(reader) = reader else {
    return Ok(());
  };

  let detector = Detector::new(CONSOLE_CANDIDATES);
  let mut reader = BufReader::new(reader);
  let mut line = Vec::new();

  loop {
    line.clear();
    if reader.read_until(b'\n', &mut line).await? == 0 {
      return Ok(());
    }
    let decoded = detector.decode(&line);
    let text = decoded.text().trim();
    if !text.is_empty() {
      info!("[{HTTRACK}] {text}");
    }
  }
}
