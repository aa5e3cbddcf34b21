//! Shared helpers for the socket-level tests.

#![allow(dead_code)]

use std::time::Duration;

use arikitari::http::response::{Response, StatusCode};
use arikitari::server::{Listener, ServerHandle};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// A response as seen on the wire by a client.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap()
    }
}

/// Reads exactly one response, keeping any trailing bytes in `buf`.
/// Returns `None` if the peer closes before a full response arrives.
pub async fn read_response<R: AsyncRead + Unpin>(stream: &mut R, buf: &mut Vec<u8>) -> Option<RawResponse> {
    loop {
        if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = std::str::from_utf8(&buf[..end]).unwrap().to_string();
            let mut lines = head.split("\r\n");
            let status_line = lines.next().unwrap();
            let status: u16 = status_line.split_whitespace().nth(1).unwrap().parse().unwrap();

            let headers: Vec<(String, String)> = lines
                .filter_map(|l| l.split_once(':'))
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .collect();

            let len: usize = headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
                .map(|(_, v)| v.parse().unwrap())
                .unwrap_or(0);

            if buf.len() >= end + 4 + len {
                let body = buf[end + 4..end + 4 + len].to_vec();
                buf.drain(..end + 4 + len);
                return Some(RawResponse { status, headers, body });
            }
        }

        let mut chunk = [0u8; 1024];
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// Sends `raw` and reads the single response to it.
pub async fn roundtrip(stream: &mut TcpStream, buf: &mut Vec<u8>, raw: &str) -> RawResponse {
    stream.write_all(raw.as_bytes()).await.unwrap();
    tokio::time::timeout(Duration::from_secs(5), read_response(stream, buf))
        .await
        .expect("response timed out")
        .expect("connection closed before response")
}

/// True once the server has closed its side of `stream`.
pub async fn is_closed_by_peer(stream: &mut TcpStream) -> bool {
    let mut byte = [0u8; 1];
    match tokio::time::timeout(Duration::from_secs(5), stream.read(&mut byte)).await {
        Ok(Ok(0)) => true,
        Ok(Err(_)) => true,
        _ => false,
    }
}

/// A listener on an ephemeral port with the demo routes registered.
pub async fn demo_listener() -> Listener {
    let mut listener = Listener::bind("127.0.0.1:0").await.unwrap();

    listener
        .get("/", |req| Ok(Response::text(&req, StatusCode::Ok, "text/plain", "arikitari")))
        .unwrap();

    listener
        .get_pattern(r"/user/(\d+)", |req, caps| {
            let id = caps.get(1).unwrap_or_default().to_string();
            Ok(Response::text(&req, StatusCode::Ok, "text/plain", format!("user {id}")))
        })
        .unwrap();

    listener
}

pub async fn start_demo() -> ServerHandle {
    demo_listener().await.start().unwrap()
}
