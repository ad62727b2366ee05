use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{format_headers, Response, HEADER_BUF_SIZE};

/// Writes one in-memory response: the rendered header followed by the body.
///
/// Short writes are retried until every byte is out. A write that accepts
/// zero bytes means the peer is gone and fails the response.
pub struct ResponseWriter<'r> {
    header: [u8; HEADER_BUF_SIZE],
    header_len: usize,
    body: &'r [u8],
    written: usize,
}

impl<'r> ResponseWriter<'r> {
    pub fn new(response: &'r Response) -> anyhow::Result<Self> {
        let mut header = [0u8; HEADER_BUF_SIZE];
        let header_len = format_headers(&mut header, response.status, response.body.len() as u64)?.len();

        Ok(Self {
            header,
            header_len,
            body: &response.body,
            written: 0,
        })
    }

    /// Total bytes this response puts on the wire.
    pub fn len(&self) -> usize {
        self.header_len + self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn written(&self) -> usize {
        self.written
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.header_len {
            let n = stream.write(&self.header[self.written..self.header_len]).await?;
            self.advance(n)?;
        }

        while self.written < self.len() {
            let offset = self.written - self.header_len;
            let n = stream.write(&self.body[offset..]).await?;
            self.advance(n)?;
        }

        stream.flush().await?;
        Ok(())
    }

    fn advance(&mut self, n: usize) -> anyhow::Result<()> {
        if n == 0 {
            return Err(anyhow::anyhow!("connection closed while writing"));
        }
        self.written += n;
        Ok(())
    }
}

/// Serializes and writes `response`.
pub async fn send_response<W>(stream: &mut W, response: &Response) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    ResponseWriter::new(response)?.write_to_stream(stream).await
}
