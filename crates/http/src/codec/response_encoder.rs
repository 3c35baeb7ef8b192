//! Response serialization.
//!
//! Every response goes out as
//!
//! ```text
//! HTTP/1.0 200 OK\n
//! Connection: keep-alive\n
//! Content-Length: <N>\r\n\r\n
//! <body, N bytes>
//! ```
//!
//! The head is derived from the body alone, so the advertised length always
//! matches what follows it.

use std::io;
use std::io::Write;

use bytes::{BufMut, Bytes, BytesMut};
use http::StatusCode;
use tokio_util::codec::Encoder;

use crate::protocol::{Response, SendError};

const STATUS_LINE: &[u8] = b"HTTP/1.0 200 OK\n";
const KEEP_ALIVE: &[u8] = b"Connection: keep-alive\n";
const CLOSE: &[u8] = b"Connection: close\n";
const CONTENT_LENGTH: &[u8] = b"Content-Length: ";
const HEAD_END: &[u8] = b"\r\n\r\n";

/// Upper bound of the head written before the body
const HEAD_SIZE: usize = 64;

/// Encoder for [`Response`] implementing the [`Encoder`] trait.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Writes a body-less response with the given status that asks the peer to close.
    pub fn encode_status(&mut self, status: StatusCode, dst: &mut BytesMut) -> Result<(), SendError> {
        dst.reserve(HEAD_SIZE);
        writeln!(FastWrite(dst), "HTTP/1.0 {} {}", status.as_str(), status.canonical_reason().unwrap_or("Unknown"))?;
        dst.put_slice(CLOSE);
        dst.put_slice(CONTENT_LENGTH);
        dst.put_slice(b"0");
        dst.put_slice(HEAD_END);
        Ok(())
    }
}

impl Encoder<&Response> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, response: &Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let body = response.body();

        dst.reserve(HEAD_SIZE + body.len());
        dst.put_slice(STATUS_LINE);
        dst.put_slice(KEEP_ALIVE);
        dst.put_slice(CONTENT_LENGTH);
        write!(FastWrite(dst), "{}", response.content_length())?;
        dst.put_slice(HEAD_END);
        dst.put_slice(body);
        Ok(())
    }
}

/// Serializes a response into a standalone buffer.
///
/// Calling it twice on the same, unmodified response yields identical bytes.
pub fn encode_response(response: &Response) -> Result<Bytes, SendError> {
    let mut dst = BytesMut::new();
    ResponseEncoder.encode(response, &mut dst)?;
    Ok(dst.freeze())
}

/// Writer adapter appending straight into a `BytesMut`.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hello_world_wire_format() {
        let mut response = Response::new();
        response.set_body("hello world\n");

        let bytes = encode_response(&response).unwrap();

        assert_eq!(&bytes[..], &b"HTTP/1.0 200 OK\nConnection: keep-alive\nContent-Length: 12\r\n\r\nhello world\n"[..]);
    }

    #[test]
    fn empty_body() {
        let bytes = encode_response(&Response::new()).unwrap();

        assert_eq!(&bytes[..], &b"HTTP/1.0 200 OK\nConnection: keep-alive\nContent-Length: 0\r\n\r\n"[..]);
    }

    #[test]
    fn content_length_counts_bytes_not_chars() {
        let mut response = Response::new();
        response.set_body("héllo");

        let bytes = encode_response(&response).unwrap();
        let text = std::str::from_utf8(&bytes).unwrap();

        assert!(text.contains("Content-Length: 6\r\n\r\n"));
        assert!(text.ends_with("héllo"));
    }

    #[test]
    fn encoding_twice_is_identical() {
        let mut response = Response::new();
        response.set_body(vec![b'x'; 10_000]);

        let first = encode_response(&response).unwrap();
        let second = encode_response(&response).unwrap();

        assert_eq!(first, second);
        assert_eq!(response.content_length(), 10_000);
    }

    #[test]
    fn encoder_appends_to_buffer() {
        let mut response = Response::new();
        response.set_body("a");
        let mut dst = BytesMut::new();

        let mut encoder = ResponseEncoder::new();
        encoder.encode(&response, &mut dst).unwrap();
        encoder.encode(&response, &mut dst).unwrap();

        let single = encode_response(&response).unwrap();
        assert_eq!(dst.len(), single.len() * 2);
        assert!(dst.ends_with(&single));
    }

    #[test]
    fn internal_server_error_status() {
        let mut dst = BytesMut::new();

        ResponseEncoder::new().encode_status(StatusCode::INTERNAL_SERVER_ERROR, &mut dst).unwrap();

        assert_eq!(&dst[..], &b"HTTP/1.0 500 Internal Server Error\nConnection: close\nContent-Length: 0\r\n\r\n"[..]);
    }
}
