//! Static file server for the converted site.
use std::{
  io,
  net::{Ipv4Addr, SocketAddr},
  path::PathBuf,
  time::Duration,
};

use axum::Router;
use color_eyre::eyre::{Context, Result};
use log::{debug, info, warn};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

/// Number of consecutive ports probed, starting at the requested one.
pub const PORT_ATTEMPTS: u16 = 100;

/// Delay before the browser is opened, giving the server time to start.
const OPEN_DELAY: Duration = Duration::from_secs(1);

/// Bind the first free port in `[port, port + PORT_ATTEMPTS)` on localhost.
///
/// # Errors
///
/// Returns an error if none of the ports can be bound.
pub async fn bind_first_available(port: u16) -> io::Result<TcpListener> {
  let end = port.saturating_add(PORT_ATTEMPTS);
  for candidate in port..end {
    match TcpListener::bind((Ipv4Addr::LOCALHOST, candidate)).await {
      Ok(listener) => return Ok(listener),
      Err(e) => debug!("Port {candidate} unavailable: {e}"),
    }
  }
  Err(io::Error::new(
    io::ErrorKind::AddrInUse,
    format!("No free port between {port} and {end}"),
  ))
}

/// Serve `output_root` until Ctrl-C is pressed or the future is dropped.
///
/// Files are served verbatim; `/` resolves to the root redirect and from
/// there to `/<domain>/index.html`.
///
/// # Errors
///
/// Returns an error if no port can be bound or the server fails.
pub async fn serve(
  output_root: PathBuf,
  domain: &str,
  port: u16,
  open_browser: bool,
) -> Result<()> {
  let listener = bind_first_available(port)
    .await
    .wrap_err("Failed to start the HTTP server")?;
  let addr: SocketAddr = listener.local_addr()?;
  if addr.port() != port {
    info!("Port {port} is busy, using {} instead", addr.port());
  }

  let url = format!("http://localhost:{}/{domain}/index.html", addr.port());
  info!("Serving {} at http://localhost:{}", output_root.display(), addr.port());
  info!("Site index: {url}");
  info!("Press Ctrl-C to stop the server");

  if open_browser {
    tokio::spawn(async move {
      tokio::time::sleep(OPEN_DELAY).await;
      if let Err(e) = open::that_detached(&url) {
        warn!("Failed to open a browser: {e}");
      }
    });
  }

  let app = Router::new().fallback_service(ServeDir::new(output_root));

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .wrap_err("HTTP server error")?;

  info!("Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!("Failed to listen for Ctrl-C: {e}");
  }
}
