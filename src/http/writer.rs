use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

/// Serializes a response into its HTTP/1.1 wire form.
///
/// The connection header always reflects `resp.keep_alive`; `Server`,
/// `Content-Type` and `Content-Length` are filled in when the response
/// does not carry them.
pub fn serialize_response(resp: &Response, server_name: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128 + resp.body.len());

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        resp.version,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    // Headers
    for (k, v) in &resp.headers {
        if k.eq_ignore_ascii_case("Connection") {
            continue;
        }
        push_header(&mut buf, k, v);
    }

    if resp.header("Server").is_none() {
        push_header(&mut buf, "Server", server_name);
    }
    if resp.header("Content-Type").is_none() {
        push_header(&mut buf, "Content-Type", "application/octet-stream");
    }
    if resp.header("Content-Length").is_none() {
        push_header(&mut buf, "Content-Length", &resp.body.len().to_string());
    }

    let connection = if resp.keep_alive { "keep-alive" } else { "close" };
    push_header(&mut buf, "Connection", connection);

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    // Body
    buf.extend_from_slice(&resp.body);

    buf
}

fn push_header(buf: &mut Vec<u8>, key: &str, value: &str) {
    buf.extend_from_slice(key.as_bytes());
    buf.extend_from_slice(b": ");
    buf.extend_from_slice(value.as_bytes());
    buf.extend_from_slice(b"\r\n");
}

/// Owns one serialized response until it has been flushed to the peer.
pub struct ResponseWriter {
    buffer: Vec<u8>,
    written: usize,
    close: bool,
}

impl ResponseWriter {
    /// Takes the response by value: nothing else can touch it while the
    /// write is in flight.
    pub fn new(response: Response, server_name: &str) -> Self {
        Self {
            buffer: serialize_response(&response, server_name),
            written: 0,
            close: response.need_eof(),
        }
    }

    /// Whether the connection must be closed after this write.
    pub fn need_eof(&self) -> bool {
        self.close
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> anyhow::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = stream.write(&self.buffer[self.written..]).await?;

            if n == 0 {
                return Err(anyhow::anyhow!("connection closed while writing"));
            }

            self.written += n;
        }

        stream.flush().await?;
        Ok(())
    }
}
