//! Errors raised while reading requests and writing responses.

use std::io;
use thiserror::Error;

/// Why a connection step failed. Any of these closes the connection.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("reading request: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("writing response: {source}")]
    Send {
        #[from]
        source: SendError,
    },
}

/// Bytes that can't be framed as a request, or a failed socket read.
///
/// Everything but [`ParseError::Io`] is swallowed by the connection, which
/// drops the buffered bytes and waits for the next request.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("request head is {current_size} bytes, limit is {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("more than {max_num} request headers")]
    TooManyHeaders { max_num: usize },

    #[error("malformed request head: {reason}")]
    InvalidHeader { reason: String },

    #[error("unsupported http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("missing or malformed request method")]
    InvalidMethod,

    #[error("missing or malformed request target")]
    InvalidUri,

    #[error("bad content-length: {reason}")]
    InvalidContentLength { reason: String },

    #[error("transfer-encoding {encoding} is not supported")]
    UnsupportedTransferEncoding { encoding: String },

    #[error("socket read failed: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn invalid_header<S: ToString>(reason: S) -> Self {
        Self::InvalidHeader { reason: reason.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(reason: S) -> Self {
        Self::InvalidContentLength { reason: reason.to_string() }
    }

    pub fn unsupported_transfer_encoding<S: ToString>(encoding: S) -> Self {
        Self::UnsupportedTransferEncoding { encoding: encoding.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("socket write failed: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}
