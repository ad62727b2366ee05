//! File transmission
//!
//! Sends the response header followed by the file body. On Linux the body
//! goes from the file descriptor straight to the socket with `sendfile(2)`,
//! never passing through a user-space buffer; the header is sent with
//! `MSG_MORE` so both can leave in as few segments as possible.

use std::io;

use tokio::fs::File;
use tokio::net::TcpStream;

use crate::http::response::{format_headers, Response, StatusCode, HEADER_BUF_SIZE};
use crate::http::writer::send_response;
use crate::static_files::{DocumentRoot, FileMetadata, ServeError};

/// Resolves `requested` under `root` and sends it as a `200` response.
///
/// When the file cannot be served an error response matching the failure is
/// sent best-effort before the error is returned. Returns the number of body
/// bytes sent.
pub async fn serve_file(
    stream: &mut TcpStream,
    root: &DocumentRoot,
    requested: &str,
) -> Result<u64, ServeError> {
    let file = match root.resolve(requested) {
        Ok(file) => file,
        Err(e) => {
            tracing::debug!(requested = requested, error = %e, "Cannot serve file");
            send_error(stream, e.status()).await;
            return Err(e);
        }
    };

    serve_resolved(stream, &file).await
}

/// Sends a file that was already resolved.
///
/// The file may have changed since it was resolved: if it can no longer be
/// opened a `500` is sent, and if it shrank the transfer fails part way.
pub async fn serve_resolved(
    stream: &mut TcpStream,
    file: &FileMetadata,
) -> Result<u64, ServeError> {
    let mut handle = match File::open(&file.path).await {
        Ok(handle) => handle,
        Err(e) => {
            tracing::error!(path = %file.path.display(), error = %e, "Failed to open resolved file");
            send_error(stream, StatusCode::InternalServerError).await;
            return Err(ServeError::Open(e));
        }
    };

    let mut buf = [0u8; HEADER_BUF_SIZE];
    let header = format_headers(&mut buf, StatusCode::Ok, file.size)
        .map_err(|e| ServeError::Transport(io::Error::other(e)))?;

    send_more(stream, header.as_bytes())
        .await
        .map_err(ServeError::Transport)?;

    match copy_file(stream, &mut handle, file.size).await {
        Ok(sent) => {
            tracing::debug!(path = %file.path.display(), bytes = sent, "File sent");
            Ok(sent)
        }
        Err(e) => {
            tracing::error!(path = %file.path.display(), error = %e, "File transfer failed");
            send_error(stream, StatusCode::InternalServerError).await;
            Err(ServeError::Transfer(e))
        }
    }
}

async fn send_error(stream: &mut TcpStream, status: StatusCode) {
    if let Err(e) = send_response(stream, &Response::for_status(status)).await {
        tracing::debug!(status = status.as_u16(), error = %e, "Could not send error response");
    }
}

#[cfg(target_os = "linux")]
const MAX_SENDFILE_CHUNK: u64 = 0x7fff_f000;

#[cfg(target_os = "linux")]
async fn send_more(stream: &mut TcpStream, mut bytes: &[u8]) -> io::Result<()> {
    use std::os::unix::io::AsRawFd;
    use tokio::io::Interest;

    let fd = stream.as_raw_fd();

    while !bytes.is_empty() {
        stream.writable().await?;

        let result = stream.try_io(Interest::WRITABLE, || {
            // SAFETY: `bytes` is a live slice and `fd` stays open for the
            // lifetime of `stream`.
            let n = unsafe {
                libc::send(
                    fd,
                    bytes.as_ptr().cast(),
                    bytes.len(),
                    libc::MSG_MORE | libc::MSG_NOSIGNAL,
                )
            };
            if n < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(n as usize)
            }
        });

        match result {
            Ok(0) => return Err(io::ErrorKind::WriteZero.into()),
            Ok(n) => bytes = &bytes[n..],
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

#[cfg(target_os = "linux")]
async fn copy_file(stream: &mut TcpStream, file: &mut File, size: u64) -> io::Result<u64> {
    use std::os::unix::io::AsRawFd;
    use tokio::io::Interest;

    let out_fd = stream.as_raw_fd();
    let in_fd = file.as_raw_fd();
    let mut offset: libc::off_t = 0;
    let mut sent: u64 = 0;

    while sent < size {
        let chunk = (size - sent).min(MAX_SENDFILE_CHUNK) as usize;
        stream.writable().await?;

        let result = stream.try_io(Interest::WRITABLE, || {
            // SAFETY: both descriptors are owned by live handles and
            // `offset` outlives the call.
            let n = unsafe { libc::sendfile(out_fd, in_fd, &mut offset, chunk) };
            if n < 0 {
                Err(io::Error::last_os_error())
            } else {
                Ok(n as usize)
            }
        });

        match result {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("file ended after {} of {} bytes", sent, size),
                ));
            }
            Ok(n) => sent += n as u64,
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(sent)
}

#[cfg(not(target_os = "linux"))]
async fn send_more(stream: &mut TcpStream, bytes: &[u8]) -> io::Result<()> {
    use tokio::io::AsyncWriteExt;

    stream.write_all(bytes).await
}

#[cfg(not(target_os = "linux"))]
async fn copy_file(stream: &mut TcpStream, file: &mut File, size: u64) -> io::Result<u64> {
    use tokio::io::AsyncReadExt;

    let sent = tokio::io::copy(&mut file.take(size), stream).await?;
    if sent < size {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("file ended after {} of {} bytes", sent, size),
        ));
    }
    Ok(sent)
}
