use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::http::parser::parse_request_head;
use crate::http::response::{Response, StatusCode};
use crate::http::router::Route;
use crate::http::writer::send_response;
use crate::server::Site;
use crate::static_files::{serve_file, ServeError};

/// Bytes read from the peer for its one request.
pub const READ_BUFFER_SIZE: usize = 1024;

/// How long unread peer data is drained after the response before closing.
const LINGER_TIMEOUT: Duration = Duration::from_secs(2);

/// Serves exactly one request, then closes.
pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    site: Arc<Site>,
    state: ConnectionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    AwaitingRequest,
    LineParsed,
    Routed,
    ResponseSent,
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, site: Arc<Site>) -> Self {
        Self {
            stream,
            peer,
            site,
            state: ConnectionState::AwaitingRequest,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Reads one request, answers it and closes the connection.
    ///
    /// Malformed requests and missing files are answered with an error
    /// response and count as handled. Socket failures end the connection
    /// with an error.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let result = self.serve_one().await;
        self.close().await;
        result
    }

    async fn serve_one(&mut self) -> anyhow::Result<()> {
        let mut buf = [0u8; READ_BUFFER_SIZE];

        let n = self.read_request(&mut buf).await?;
        if n == 0 {
            tracing::debug!(peer = %self.peer, "Connection closed before request");
            return Ok(());
        }

        let line = match parse_request_head(&buf[..n]) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(peer = %self.peer, error = %e, "Failed to parse request line");
                self.respond(&Response::for_status(e.status())).await?;
                return Ok(());
            }
        };
        self.transition(ConnectionState::LineParsed);

        tracing::debug!(
            peer = %self.peer,
            method = %line.method,
            uri = %line.uri,
            version = %line.version,
            "Request line parsed"
        );

        let site = Arc::clone(&self.site);
        let route = site.router.route(line.uri);
        self.transition(ConnectionState::Routed);

        let status = match route {
            Some(Route::Fixed(response)) => {
                self.respond(response).await?;
                response.status
            }
            Some(Route::File(name)) => match serve_file(&mut self.stream, &site.root, name).await {
                Ok(_) => StatusCode::Ok,
                Err(e @ (ServeError::NotFound | ServeError::Traversal | ServeError::PathTooLong)) => {
                    e.status()
                }
                Err(e) => return Err(e.into()),
            },
            None => {
                tracing::warn!(peer = %self.peer, uri = %line.uri, "Unknown route");
                self.respond(&Response::not_found()).await?;
                StatusCode::NotFound
            }
        };
        self.transition(ConnectionState::ResponseSent);

        tracing::info!(
            peer = %self.peer,
            method = %line.method,
            uri = %line.uri,
            status = status.as_u16(),
            "Request served"
        );

        Ok(())
    }

    /// Performs the single read this connection gets.
    async fn read_request(&mut self, buf: &mut [u8]) -> anyhow::Result<usize> {
        let read = self.stream.read(buf);

        let n = match self.site.read_timeout {
            Some(limit) => timeout(limit, read)
                .await
                .map_err(|_| anyhow::anyhow!("timed out waiting for request"))??,
            None => read.await?,
        };

        Ok(n)
    }

    async fn respond(&mut self, response: &Response) -> anyhow::Result<()> {
        send_response(&mut self.stream, response).await
    }

    /// Half-closes, drains whatever the peer still sends so the close is not
    /// turned into a reset, then drops to `Closed`.
    async fn close(&mut self) {
        if self.stream.shutdown().await.is_ok() {
            let mut sink = [0u8; READ_BUFFER_SIZE];
            let _ = timeout(LINGER_TIMEOUT, async {
                while let Ok(n) = self.stream.read(&mut sink).await {
                    if n == 0 {
                        break;
                    }
                }
            })
            .await;
        }
        self.transition(ConnectionState::Closed);
    }

    fn transition(&mut self, next: ConnectionState) {
        tracing::trace!(peer = %self.peer, from = ?self.state, to = ?next, "Connection state");
        self.state = next;
    }
}
