//! Run supervision: the mirror, the conversion and the server race against
//! one wall-clock timeout and Ctrl-C.
use std::{future::Future, io, time::Duration};

use color_eyre::eyre::{Context, Result};
use log::info;
use tokio::time::Instant;

use crate::{
  config::Config,
  mirror::MirrorCommand,
  utils::{ConversionReport, convert_site},
};

/// How a supervised run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome<T> {
  Completed(T),
  /// The overall timeout elapsed first.
  TimedOut(Duration),
  /// The user interrupted the run.
  Cancelled,
}

/// Deadline for the whole run, armed once when the run starts.
///
/// Every phase races against the same deadline, so time spent mirroring and
/// converting is taken off the time left for serving.
#[derive(Debug, Clone, Copy)]
pub struct Watchdog {
  limit:    Option<Duration>,
  deadline: Option<Instant>,
}

impl Watchdog {
  /// Arm the watchdog now. `None` never fires.
  #[must_use]
  pub fn start(limit: Option<Duration>) -> Self {
    Self {
      limit,
      deadline: limit.map(|limit| Instant::now() + limit),
    }
  }

  /// Time left before the watchdog fires.
  #[must_use]
  pub fn remaining(&self) -> Option<Duration> {
    self
      .deadline
      .map(|deadline| deadline.saturating_duration_since(Instant::now()))
  }

  /// Resolve with the configured limit once the deadline passes.
  async fn expired(self) -> Duration {
    match (self.deadline, self.limit) {
      (Some(deadline), Some(limit)) => {
        tokio::time::sleep_until(deadline).await;
        limit
      },
      _ => std::future::pending().await,
    }
  }
}

/// Drive `work` until it finishes, the watchdog fires, or `cancel` resolves,
/// whichever comes first. Dropping `work` aborts it.
///
/// # Errors
///
/// Returns the error of `work`, or an error if `cancel` fails.
pub async fn race<T, W, C>(
  work: W,
  watchdog: Watchdog,
  cancel: C,
) -> Result<RunOutcome<T>>
where
  W: Future<Output = Result<T>>,
  C: Future<Output = io::Result<()>>,
{
  tokio::select! {
    result = work => result.map(RunOutcome::Completed),
    limit = watchdog.expired() => Ok(RunOutcome::TimedOut(limit)),
    signal = cancel => {
      signal.wrap_err("Failed to listen for Ctrl-C")?;
      Ok(RunOutcome::Cancelled)
    },
  }
}

/// Mirror (if configured) and convert the site, supervised by `watchdog` and
/// Ctrl-C.
///
/// # Errors
///
/// Returns an error if mirroring or the conversion setup fails.
pub async fn supervise(
  config: &Config,
  watchdog: Watchdog,
) -> Result<RunOutcome<ConversionReport>> {
  if let Some(limit) = watchdog.limit {
    info!("Run will be aborted after {} seconds", limit.as_secs());
  }

  race(
    mirror_and_convert(config.clone()),
    watchdog,
    tokio::signal::ctrl_c(),
  )
  .await
}

/// Run a server until it stops by itself or `watchdog` fires.
///
/// The server handles Ctrl-C as a graceful stop, which counts as completion.
///
/// # Errors
///
/// Returns the error of `server`.
pub async fn serve_until<S>(server: S, watchdog: Watchdog) -> Result<RunOutcome<()>>
where
  S: Future<Output = Result<()>>,
{
  race(server, watchdog, std::future::pending()).await
}

async fn mirror_and_convert(config: Config) -> Result<ConversionReport> {
  if let Some(mirror) = MirrorCommand::from_config(&config) {
    mirror.run().await.wrap_err("Mirroring failed")?;
  }

  tokio::task::spawn_blocking(move || convert_site(&config))
    .await
    .wrap_err("Conversion task failed")?
}
