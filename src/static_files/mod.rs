//! Static file serving from a sandboxed document root
//!
//! This module resolves request paths against the document root and streams
//! file contents to the client with a zero-copy transfer.

pub mod resolver;
pub mod transfer;

use std::fmt;
use std::io;

use crate::http::response::StatusCode;

pub use resolver::{DocumentRoot, FileMetadata};
pub use transfer::{serve_file, serve_resolved};

/// Failure modes of resolving and sending a file.
#[derive(Debug)]
pub enum ServeError {
    /// The path does not name a regular file under the document root.
    NotFound,
    /// The resolved path lies outside the document root.
    Traversal,
    /// The composed path exceeds the platform path limit.
    PathTooLong,
    /// The file vanished or could not be opened after it was resolved.
    Open(io::Error),
    /// Copying file bytes to the socket failed mid-stream.
    Transfer(io::Error),
    /// Writing the response header to the socket failed.
    Transport(io::Error),
}

impl ServeError {
    /// The status the client is answered with, when one is still sendable.
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::NotFound | ServeError::Traversal => StatusCode::NotFound,
            ServeError::PathTooLong => StatusCode::BadRequest,
            ServeError::Open(_) | ServeError::Transfer(_) | ServeError::Transport(_) => {
                StatusCode::InternalServerError
            }
        }
    }
}

impl fmt::Display for ServeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServeError::NotFound => write!(f, "file not found"),
            ServeError::Traversal => write!(f, "path escapes the document root"),
            ServeError::PathTooLong => write!(f, "path exceeds the platform path limit"),
            ServeError::Open(e) => write!(f, "failed to open file: {}", e),
            ServeError::Transfer(e) => write!(f, "file transfer failed: {}", e),
            ServeError::Transport(e) => write!(f, "failed to send response: {}", e),
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServeError::Open(e) | ServeError::Transfer(e) | ServeError::Transport(e) => Some(e),
            _ => None,
        }
    }
}
