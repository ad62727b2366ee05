use crate::http::span::ByteSpan;

/// The first line of an HTTP request: `METHOD SP REQUEST-URI SP HTTP-VERSION`.
///
/// All three parts borrow the connection's read buffer and are only valid
/// while that buffer is. No check is made on the content of any part; the
/// method may be anything and the version need not start with `HTTP/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLine<'a> {
    /// Request method token (e.g. `GET`)
    pub method: ByteSpan<'a>,
    /// Request target exactly as sent (e.g. `/`)
    pub uri: ByteSpan<'a>,
    /// Protocol version token (e.g. `HTTP/1.0`)
    pub version: ByteSpan<'a>,
}

impl<'a> RequestLine<'a> {
    /// Returns the URI as UTF-8, or `None` when it is not valid UTF-8.
    pub fn uri_str(&self) -> Option<&'a str> {
        self.uri.as_str()
    }
}
