use std::fmt;

use crate::http::request::RequestLine;
use crate::http::response::StatusCode;
use crate::http::span::{split, SplitResult};

const SP: &[u8] = b" ";
const CRLF: &[u8] = b"\r\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The request line did not split into exactly three tokens.
    WrongTokenCount(usize),
    /// No request line was available to parse.
    MissingRequestLine,
}

impl ParseError {
    /// The status a client is answered with for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ParseError::WrongTokenCount(_) => StatusCode::BadRequest,
            ParseError::MissingRequestLine => StatusCode::InternalServerError,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::WrongTokenCount(n) => {
                write!(f, "invalid request line: expected 3 components, got {}", n)
            }
            ParseError::MissingRequestLine => write!(f, "empty request"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Splits a raw request buffer into CRLF-separated lines.
pub fn split_lines(buf: &[u8]) -> SplitResult<'_> {
    split(buf, CRLF)
}

/// Parses a single request line into its method, URI and version.
///
/// Succeeds only when the line splits on single spaces into exactly three
/// tokens. Adjacent spaces produce empty tokens, which count towards the
/// total.
pub fn parse_request_line(line: &[u8]) -> Result<RequestLine<'_>, ParseError> {
    let components = split(line, SP);

    if components.len() != 3 {
        return Err(ParseError::WrongTokenCount(components.len()));
    }

    Ok(RequestLine {
        method: components[0],
        uri: components[1],
        version: components[2],
    })
}

/// Parses the request line at the head of a full request buffer.
///
/// A buffer yielding no lines at all is reported as
/// [`ParseError::MissingRequestLine`].
pub fn parse_request_head(buf: &[u8]) -> Result<RequestLine<'_>, ParseError> {
    let lines = split_lines(buf);
    let first = lines.first().ok_or(ParseError::MissingRequestLine)?;
    parse_request_line(first.as_bytes())
}
