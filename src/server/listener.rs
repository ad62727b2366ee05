use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, TcpSocket};
use tracing::info;

use crate::config::Config;
use crate::http::connection::Connection;
use crate::server::Site;

pub async fn run(cfg: &Config) -> anyhow::Result<()> {
    let site = Site::from_config(cfg).with_context(|| {
        format!(
            "failed to prepare document root {}",
            cfg.static_files.root.display()
        )
    })?;
    info!("Serving files from {}", site.root.path().display());

    let listener = bind(&cfg.server.listen_addr).await?;
    info!("Listening on http://{}/", listener.local_addr()?);

    serve(listener, Arc::new(site)).await
}

/// Binds `addr` with `SO_REUSEADDR` and the platform's maximum backlog.
pub async fn bind(addr: &str) -> anyhow::Result<TcpListener> {
    let addr: SocketAddr = tokio::net::lookup_host(addr)
        .await
        .with_context(|| format!("invalid listen address {}", addr))?
        .next()
        .with_context(|| format!("listen address {} resolved to nothing", addr))?;

    let socket = if addr.is_ipv4() {
        TcpSocket::new_v4()?
    } else {
        TcpSocket::new_v6()?
    };
    socket.set_reuseaddr(true)?;
    socket
        .bind(addr)
        .with_context(|| format!("failed to bind {}", addr))?;

    Ok(socket.listen(libc::SOMAXCONN as u32)?)
}

/// Accepts connections forever, one task per connection.
///
/// Nothing that happens on a single connection stops the loop.
pub async fn serve(listener: TcpListener, site: Arc<Site>) -> anyhow::Result<()> {
    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!("Failed to accept connection: {}", e);
                continue;
            }
        };
        info!("Accepted connection from {}", peer);

        let site = Arc::clone(&site);
        tokio::spawn(async move {
            let mut conn = Connection::new(socket, peer, site);
            if let Err(e) = conn.run().await {
                tracing::error!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}
