//! Borrowed byte spans and the delimiter splitter built on them.
//!
//! A [`ByteSpan`] is an `(offset, len)` window into a buffer it does not own.
//! The borrow checker ties every span to the buffer it was cut from, so a
//! span can never outlive the read buffer of the connection that produced it.

use std::fmt;
use std::ops::Index;

use memchr::memmem;

/// Initial number of spans reserved by [`split`].
const INITIAL_SPLITS: usize = 8;

/// A non-owning view of `len` bytes starting at `offset` in `buf`.
///
/// Invariant: `offset + len <= buf.len()`.
#[derive(Clone, Copy)]
pub struct ByteSpan<'a> {
    buf: &'a [u8],
    offset: usize,
    len: usize,
}

impl<'a> ByteSpan<'a> {
    /// Creates a span over `buf[offset..offset + len]`.
    ///
    /// Returns `None` if the window does not fit inside `buf`.
    pub fn new(buf: &'a [u8], offset: usize, len: usize) -> Option<Self> {
        let end = offset.checked_add(len)?;
        if end > buf.len() {
            return None;
        }
        Some(Self { buf, offset, len })
    }

    /// A span covering all of `buf`.
    pub fn whole(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            len: buf.len(),
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The viewed bytes, borrowed for the lifetime of the source buffer.
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.buf[self.offset..self.offset + self.len]
    }

    /// The viewed bytes as UTF-8, if they are valid.
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.as_bytes()).ok()
    }
}

impl PartialEq for ByteSpan<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for ByteSpan<'_> {}

impl PartialEq<[u8]> for ByteSpan<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}

impl PartialEq<&[u8]> for ByteSpan<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.as_bytes() == *other
    }
}

impl<const N: usize> PartialEq<&[u8; N]> for ByteSpan<'_> {
    fn eq(&self, other: &&[u8; N]) -> bool {
        self.as_bytes() == &other[..]
    }
}

impl PartialEq<str> for ByteSpan<'_> {
    fn eq(&self, other: &str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for ByteSpan<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl fmt::Debug for ByteSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSpan({}..{}, \"", self.offset, self.offset + self.len)?;
        for &b in self.as_bytes() {
            write!(f, "{}", std::ascii::escape_default(b))?;
        }
        write!(f, "\")")
    }
}

impl fmt::Display for ByteSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

/// Ordered spans produced by [`split`].
///
/// Owns the storage holding the spans; the spans themselves still borrow the
/// split buffer. The storage is released when the value is dropped.
#[derive(Debug, Default)]
pub struct SplitResult<'a> {
    spans: Vec<ByteSpan<'a>>,
}

impl<'a> SplitResult<'a> {
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<ByteSpan<'a>> {
        self.spans.get(index).copied()
    }

    pub fn first(&self) -> Option<ByteSpan<'a>> {
        self.get(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = ByteSpan<'a>> + '_ {
        self.spans.iter().copied()
    }

    pub fn as_slice(&self) -> &[ByteSpan<'a>] {
        &self.spans
    }
}

impl<'a> Index<usize> for SplitResult<'a> {
    type Output = ByteSpan<'a>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.spans[index]
    }
}

impl<'a> IntoIterator for SplitResult<'a> {
    type Item = ByteSpan<'a>;
    type IntoIter = std::vec::IntoIter<ByteSpan<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.into_iter()
    }
}

/// Splits `buf` on every occurrence of `delimiter`, scanning left to right.
///
/// A match is only honored when at least one byte follows it, so a delimiter
/// sitting at the very end of `buf` stays part of the last span:
/// splitting `"a b "` on `" "` yields `["a", "b "]`. Any bytes after the last
/// honored match form a final span; an empty trailing span is never produced.
///
/// An empty `delimiter` never matches.
pub fn split<'a>(buf: &'a [u8], delimiter: &[u8]) -> SplitResult<'a> {
    let mut spans = Vec::with_capacity(INITIAL_SPLITS);
    let mut start = 0;

    if !delimiter.is_empty() {
        for at in memmem::find_iter(buf, delimiter) {
            if at + delimiter.len() >= buf.len() {
                break;
            }
            spans.push(ByteSpan {
                buf,
                offset: start,
                len: at - start,
            });
            start = at + delimiter.len();
        }
    }

    if start < buf.len() {
        spans.push(ByteSpan {
            buf,
            offset: start,
            len: buf.len() - start,
        });
    }

    SplitResult { spans }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<'a>(result: &SplitResult<'a>) -> Vec<&'a [u8]> {
        result.iter().map(|s| s.as_bytes()).collect()
    }

    #[test]
    fn split_three_words() {
        let result = split(b"a b c", b" ");
        assert_eq!(collect(&result), vec![&b"a"[..], b"b", b"c"]);
    }

    #[test]
    fn split_empty_buffer() {
        assert!(split(b"", b" ").is_empty());
    }

    #[test]
    fn trailing_delimiter_stays_in_last_span() {
        let result = split(b"a b ", b" ");
        assert_eq!(collect(&result), vec![&b"a"[..], b"b "]);
    }

    #[test]
    fn lone_delimiter_is_one_span() {
        let result = split(b"\r\n", b"\r\n");
        assert_eq!(result.len(), 1);
        assert_eq!(result[0], "\r\n");
    }

    #[test]
    fn adjacent_delimiters_yield_empty_spans() {
        let result = split(b"a  b", b" ");
        assert_eq!(collect(&result), vec![&b"a"[..], b"", b"b"]);
    }

    #[test]
    fn spans_keep_offsets_into_source() {
        let buf = b"GET /index HTTP/1.0";
        let result = split(buf, b" ");
        assert_eq!(result[1].offset(), 4);
        assert_eq!(result[1].len(), 6);
    }

    #[test]
    fn grows_past_initial_capacity() {
        let buf = b"0,1,2,3,4,5,6,7,8,9,10,11,12,13,14,15,16,17";
        let result = split(buf, b",");
        assert_eq!(result.len(), 18);
        assert_eq!(result[17], "17");
    }

    #[test]
    fn empty_delimiter_never_matches() {
        let result = split(b"abc", b"");
        assert_eq!(collect(&result), vec![&b"abc"[..]]);
    }

    #[test]
    fn rejoining_reconstructs_a_prefix() {
        let inputs: [&[u8]; 5] = [b"a,b,,c", b",x", b"abc,", b"", b",,,,"];
        for buf in inputs {
            let joined = split(buf, b",")
                .iter()
                .map(|s| s.as_bytes().to_vec())
                .collect::<Vec<_>>()
                .join(&b","[..]);
            assert!(buf.starts_with(&joined), "{:?}", String::from_utf8_lossy(buf));
        }
    }

    #[test]
    fn span_bounds_are_checked() {
        let buf = b"hello";
        assert!(ByteSpan::new(buf, 2, 3).is_some());
        assert!(ByteSpan::new(buf, 2, 4).is_none());
        assert!(ByteSpan::new(buf, usize::MAX, 2).is_none());
    }
}
