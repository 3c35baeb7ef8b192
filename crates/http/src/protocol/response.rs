//! The response entity filled in by a [`Handler`](crate::handler::Handler).
//!
//! Only the body is stored. The status line and headers are derived from it
//! when the [`ResponseEncoder`](crate::codec::ResponseEncoder) serializes the
//! response, so `Content-Length` can never drift from the body.

use bytes::{BufMut, BytesMut};

/// An HTTP response under construction.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Response {
    body: BytesMut,
}

impl Response {
    /// Creates an empty response.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the body with the given bytes.
    pub fn set_body<B: AsRef<[u8]>>(&mut self, body: B) {
        self.body.clear();
        self.body.put_slice(body.as_ref());
    }

    /// Appends bytes to the end of the body.
    pub fn append_body<B: AsRef<[u8]>>(&mut self, chunk: B) {
        self.body.put_slice(chunk.as_ref());
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut BytesMut {
        &mut self.body
    }

    /// The exact number of body bytes, as advertised by `Content-Length`.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_body_replaces_previous_content() {
        let mut response = Response::new();
        response.set_body("first");
        response.set_body("hello world\n");

        assert_eq!(response.body(), b"hello world\n");
        assert_eq!(response.content_length(), 12);
    }

    #[test]
    fn append_body() {
        let mut response = Response::new();
        response.append_body("hello ");
        response.append_body(b"world");
        response.body_mut().put_u8(b'\n');

        assert_eq!(response.body(), b"hello world\n");
    }
}
