use std::fmt;
use std::io::{Cursor, Write};

use bytes::Bytes;

use crate::http::span::ByteSpan;

/// Size of the scratch buffer response headers are rendered into.
///
/// Fits a 200 header with any `u64` content length, and every error header
/// with its fixed body length.
pub const HEADER_BUF_SIZE: usize = 64;

/// Body sent with every 404 response.
pub const NOT_FOUND_BODY: &[u8] = b"<p>Error 404: Not Found</p><p><a href=\"/\">Back to home</a></p>";

pub const BAD_REQUEST_BODY: &[u8] = b"<p>Error 400: Bad Request</p>";

pub const INTERNAL_ERROR_BODY: &[u8] = b"<p>Error 500: Internal Server Error</p>";

const HTTP_VERSION: &str = "HTTP/1.0";

/// HTTP status codes emitted by the server.
///
/// - `Ok` (200): Request successful
/// - `BadRequest` (400): Malformed request line
/// - `NotFound` (404): Unknown route or missing file
/// - `InternalServerError` (500): Server error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 500 Internal Server Error
    InternalServerError,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use docroot::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::InternalServerError => 500,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        reason_phrase_for(self.as_u16())
    }

    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            400 => Some(StatusCode::BadRequest),
            404 => Some(StatusCode::NotFound),
            500 => Some(StatusCode::InternalServerError),
            _ => None,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}

/// Reason phrase for any numeric code; codes outside the known set map to
/// `Unknown`.
pub fn reason_phrase_for(code: u16) -> &'static str {
    match code {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Returned when a rendered header does not fit the caller's buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderOverflow {
    pub capacity: usize,
}

impl fmt::Display for HeaderOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "response header exceeds {} byte buffer", self.capacity)
    }
}

impl std::error::Error for HeaderOverflow {}

/// Renders `HTTP/1.0 <code> <reason>\r\nContent-Length: <n>\r\n\r\n` into
/// `buf` and returns a span over the written bytes.
///
/// `buf` is caller owned and may be reused for every response on a
/// connection. Bytes past the returned span are left untouched.
pub fn format_headers(
    buf: &mut [u8],
    status: StatusCode,
    body_len: u64,
) -> Result<ByteSpan<'_>, HeaderOverflow> {
    let capacity = buf.len();
    let mut cursor = Cursor::new(&mut buf[..]);

    write!(
        cursor,
        "{} {} {}\r\nContent-Length: {}\r\n\r\n",
        HTTP_VERSION,
        status.as_u16(),
        status.reason_phrase(),
        body_len
    )
    .map_err(|_| HeaderOverflow { capacity })?;

    let written = cursor.position() as usize;
    Ok(ByteSpan::whole(&buf[..written]))
}

/// A response with an in-memory body.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// Response body as bytes
    pub body: Bytes,
}

impl Response {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Creates a simple 200 OK response with the given body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::Ok, body)
    }

    /// Creates a 400 Bad Request response.
    pub fn bad_request() -> Self {
        Self::new(StatusCode::BadRequest, Bytes::from_static(BAD_REQUEST_BODY))
    }

    /// Creates a 404 Not Found response carrying the fixed error page.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound, Bytes::from_static(NOT_FOUND_BODY))
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        Self::new(
            StatusCode::InternalServerError,
            Bytes::from_static(INTERNAL_ERROR_BODY),
        )
    }

    /// The canned error response for `status`.
    pub fn for_status(status: StatusCode) -> Self {
        match status {
            StatusCode::Ok => Self::ok(Bytes::new()),
            StatusCode::BadRequest => Self::bad_request(),
            StatusCode::NotFound => Self::not_found(),
            StatusCode::InternalServerError => Self::internal_error(),
        }
    }
}
