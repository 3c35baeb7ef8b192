//! Adapter between a connection's input buffer and the [`RequestDecoder`].
//!
//! A parse pass runs the decoder once over the accumulated bytes and reports
//! the message-complete boundary through a callback, which fires zero or one
//! times per pass.

use bytes::BytesMut;
use tokio_util::codec::Decoder;

use crate::codec::RequestDecoder;
use crate::protocol::{ParseError, RequestHeader};

/// Outcome of one parse pass.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    /// A full message was consumed and the callback fired.
    Complete,
    /// The buffered bytes don't hold a full message yet.
    Partial,
}

impl ParseStatus {
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self, ParseStatus::Complete)
    }
}

/// Per-connection request parser.
#[derive(Debug, Default)]
pub struct RequestParser {
    decoder: RequestDecoder,
}

impl RequestParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one parse pass over `src`.
    ///
    /// Consumed bytes are removed from `src`; bytes of a following request are
    /// left in place. On error the partial message state is dropped so the next
    /// pass starts from a fresh request head.
    pub fn execute<F>(&mut self, src: &mut BytesMut, on_message_complete: F) -> Result<ParseStatus, ParseError>
    where
        F: FnOnce(RequestHeader),
    {
        match self.decoder.decode(src) {
            Ok(Some(header)) => {
                on_message_complete(header);
                Ok(ParseStatus::Complete)
            }
            Ok(None) => Ok(ParseStatus::Partial),
            Err(e) => {
                self.decoder.reset();
                Err(e)
            }
        }
    }
}
