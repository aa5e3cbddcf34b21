use crate::http::request::{Method, Request};
use std::collections::HashMap;

/// Upper bound on a request head (request line plus headers).
pub const MAX_HEAD_SIZE: usize = 64 * 1024;
/// Upper bound on a declared request body.
pub const MAX_BODY_SIZE: usize = 8 * 1024 * 1024;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("malformed request line")]
    InvalidRequest,
    #[error("unknown HTTP method")]
    InvalidMethod,
    #[error("unsupported HTTP version")]
    InvalidVersion,
    #[error("malformed header line")]
    InvalidHeader,
    #[error("invalid Content-Length")]
    InvalidContentLength,
    #[error("transfer-encoding is not supported")]
    UnsupportedTransferEncoding,
    #[error("request head exceeds {MAX_HEAD_SIZE} bytes")]
    HeadersTooLarge,
    #[error("request body exceeds {MAX_BODY_SIZE} bytes")]
    BodyTooLarge,
    #[error("incomplete request")]
    Incomplete,
}

/// Parses one request from the front of `buf`.
///
/// Returns the request and the number of bytes it occupied, so pipelined
/// requests behind it stay in the buffer. `ParseError::Incomplete` means
/// more bytes are needed.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    // Look for header/body separator
    let headers_end = match find_headers_end(buf) {
        Some(end) if end <= MAX_HEAD_SIZE => end,
        Some(_) => return Err(ParseError::HeadersTooLarge),
        None if buf.len() > MAX_HEAD_SIZE => return Err(ParseError::HeadersTooLarge),
        None => return Err(ParseError::Incomplete),
    };
    let header_bytes = &buf[..headers_end];
    let body_bytes = &buf[headers_end + 4..];

    let headers_str = std::str::from_utf8(header_bytes)
        .map_err(|_| ParseError::InvalidRequest)?;

    let mut lines = headers_str.split("\r\n");

    // Request line
    let request_line = lines.next().ok_or(ParseError::InvalidRequest)?;
    let mut parts = request_line.split_whitespace();

    let method_str = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    if parts.next().is_some() {
        return Err(ParseError::InvalidRequest);
    }

    let method = Method::from_str(method_str).ok_or(ParseError::InvalidMethod)?;

    if version != "HTTP/1.1" && version != "HTTP/1.0" {
        return Err(ParseError::InvalidVersion);
    }

    // Headers
    let mut headers = HashMap::new();
    let mut content_length: Option<usize> = None;

    for line in lines {
        if line.is_empty() {
            continue;
        }

        let (key, value) = line
            .split_once(':')
            .ok_or(ParseError::InvalidHeader)?;

        if key.is_empty() || key.ends_with(char::is_whitespace) {
            return Err(ParseError::InvalidHeader);
        }

        let (key, value) = (key.trim(), value.trim());

        // Repeats are tolerated only when they agree.
        if key.eq_ignore_ascii_case("Content-Length") {
            let len = value
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength)?;
            if content_length.is_some_and(|seen| seen != len) {
                return Err(ParseError::InvalidContentLength);
            }
            content_length = Some(len);
        }

        headers.insert(key.to_string(), value.to_string());
    }

    if headers.keys().any(|k| k.eq_ignore_ascii_case("Transfer-Encoding")) {
        return Err(ParseError::UnsupportedTransferEncoding);
    }

    // Body
    let content_length = content_length.unwrap_or(0);
    if content_length > MAX_BODY_SIZE {
        return Err(ParseError::BodyTooLarge);
    }

    if body_bytes.len() < content_length {
        return Err(ParseError::Incomplete);
    }

    let body = body_bytes[..content_length].to_vec();

    let request = Request {
        method,
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body,
    };

    let total_consumed = headers_end + 4 + content_length;
    Ok((request, total_consumed))
}

fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}
