//! HTTP request decoder.
//!
//! [`RequestDecoder`] frames whole request messages out of a connection's
//! input buffer. It yields an item only at the message-complete boundary:
//! after the head has been parsed and every `Content-Length` body byte has
//! been consumed. The body bytes themselves are dropped since handlers never
//! see the request.
//!
//! The decoder keeps its progress between calls, so a message whose bytes
//! arrive over several socket reads is reassembled.
//!
//! # Example
//!
//! ```
//! use nano_http::codec::RequestDecoder;
//! use tokio_util::codec::Decoder;
//! use bytes::BytesMut;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = BytesMut::from("GET / HTTP/1.1\r\n");
//! assert!(decoder.decode(&mut buffer).unwrap().is_none());
//!
//! buffer.extend_from_slice(b"\r\n");
//! let header = decoder.decode(&mut buffer).unwrap().unwrap();
//! assert_eq!(header.uri().path(), "/");
//! ```

use std::cmp;

use crate::codec::header::HeaderDecoder;
use crate::protocol::{ParseError, PayloadSize, RequestHeader};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Decoder;
use tracing::trace;

/// A decoder for whole HTTP request messages.
///
/// # State Machine
///
/// - `pending` is `None`: parsing the request head
/// - `pending` is `Some`: the head is parsed, skipping `remaining` body bytes
#[derive(Debug, Default)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    pending: Option<PendingBody>,
}

#[derive(Debug)]
struct PendingBody {
    header: RequestHeader,
    remaining: u64,
}

impl RequestDecoder {
    /// Creates a new `RequestDecoder` instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if part of a message has been consumed but the message is not complete yet.
    pub fn is_in_message(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops any partially decoded message.
    pub fn reset(&mut self) {
        self.pending = None;
    }
}

impl Decoder for RequestDecoder {
    type Item = RequestHeader;
    type Error = ParseError;

    /// Attempts to decode one complete request message from the buffer.
    ///
    /// - `Ok(Some(header))`: a whole message was consumed from `src`
    /// - `Ok(None)`: need more data to proceed
    /// - `Err(_)`: the bytes can never form a valid request
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.pending.is_none() {
            match self.header_decoder.decode(src)? {
                Some((header, PayloadSize::Empty)) => return Ok(Some(header)),
                Some((header, payload_size)) => {
                    self.pending = Some(PendingBody { header, remaining: payload_size.remaining() });
                }
                None => return Ok(None),
            }
        }

        let Some(pending) = self.pending.as_mut() else {
            return Ok(None);
        };

        let skip = usize::try_from(pending.remaining).map_or(src.len(), |remaining| cmp::min(remaining, src.len()));
        src.advance(skip);
        pending.remaining -= skip as u64;
        trace!(skipped = skip, remaining = pending.remaining, "skipping request body");

        if pending.remaining > 0 {
            return Ok(None);
        }

        Ok(self.pending.take().map(|pending| pending.header))
    }
}
