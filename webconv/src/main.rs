use std::{fs, process::ExitCode};

use color_eyre::eyre::{Context, Result, bail};
use log::{LevelFilter, error, info, warn};
use webconv::{
  cli::{Cli, Commands},
  config::Config,
  run::{self, RunOutcome, Watchdog},
  utils::ConversionReport,
};

fn main() -> Result<ExitCode> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  if let Some(command) = &cli.command {
    match command {
      Commands::Init {
        output,
        format,
        force,
      } => {
        if output.exists() && !force {
          bail!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            output.display()
          );
        }

        if let Some(parent) = output.parent()
          && !parent.as_os_str().is_empty()
          && !parent.exists()
        {
          fs::create_dir_all(parent).wrap_err_with(|| {
            format!("Failed to create directory: {}", parent.display())
          })?;
          info!("Created directory: {}", parent.display());
        }

        Config::generate_default_config(format, output).wrap_err_with(
          || {
            format!(
              "Failed to generate configuration file: {}",
              output.display()
            )
          },
        )?;
        info!("Edit {} and pass it with --config-file", output.display());
      },

      Commands::ExportTemplates { output_dir, force } => {
        Config::export_templates(output_dir, *force).wrap_err_with(|| {
          format!("Failed to export templates to {}", output_dir.display())
        })?;
      },
    }
    return Ok(ExitCode::SUCCESS);
  }

  let config = Config::load(&cli).wrap_err("Invalid configuration")?;

  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()
    .wrap_err("Failed to start the async runtime")?;

  let watchdog = Watchdog::start(config.timeout_duration());
  let outcome = match runtime.block_on(run::supervise(&config, watchdog)) {
    Ok(RunOutcome::Completed(report)) => {
      log_report(&report);
      if config.server {
        runtime.block_on(serve(&config, watchdog))
      } else {
        Ok(RunOutcome::Completed(()))
      }
    },
    Ok(RunOutcome::TimedOut(limit)) => Ok(RunOutcome::TimedOut(limit)),
    Ok(RunOutcome::Cancelled) => Ok(RunOutcome::Cancelled),
    Err(e) => Err(e),
  };

  let result = outcome.map(|outcome| {
    match outcome {
      RunOutcome::Completed(()) => ExitCode::SUCCESS,
      RunOutcome::TimedOut(limit) => {
        error!(
          "Timed out after {} seconds, the run was aborted",
          limit.as_secs()
        );
        ExitCode::FAILURE
      },
      RunOutcome::Cancelled => {
        warn!("Cancelled by user");
        ExitCode::FAILURE
      },
    }
  });

  // Conversion may still be running on a blocking thread after a timeout or
  // cancellation
  runtime.shutdown_background();
  result
}

fn log_report(report: &ConversionReport) {
  let files = &report.files;
  info!(
    "Done: {} of {} files converted, {} copied, {} failed",
    files.converted, files.total, files.copied, files.failed
  );
  if report.index.placeholder {
    warn!("The index only lists a placeholder entry");
  }
  info!("Index page: {}", report.index.index_path.display());
}

#[cfg(feature = "serve")]
async fn serve(config: &Config, watchdog: Watchdog) -> Result<RunOutcome<()>> {
  if let Some(left) = watchdog.remaining() {
    info!("Server will stop in {} seconds", left.as_secs());
  }

  run::serve_until(
    webconv::serve::serve(
      config.output_root(),
      &config.domain,
      config.port,
      config.open_browser,
    ),
    watchdog,
  )
  .await
}

#[cfg(not(feature = "serve"))]
#[allow(clippy::unused_async, reason = "Matches the serving build")]
async fn serve(_config: &Config, _watchdog: Watchdog) -> Result<RunOutcome<()>> {
  warn!("This build has no HTTP server, rebuild with the `serve` feature");
  Ok(RunOutcome::Completed(()))
}
