//! HTTP header decoder for parsing request heads.
//!
//! Parses the request line and header fields with `httparse` and decides how
//! many body bytes follow the head.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header size: 8KB
//! - Only HTTP/1.0 and HTTP/1.1
//! - Bodies are framed by `Content-Length` only; chunked transfer encoding is rejected

use bytes::{Buf, BytesMut};
use http::{HeaderMap, HeaderName, HeaderValue, Request};
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;

use crate::protocol::{ParseError, PayloadSize, RequestHeader};

/// Maximum number of headers allowed in a request
pub(crate) const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
pub(crate) const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Decoder for HTTP request heads implementing the [`Decoder`] trait.
///
/// On success the head bytes are split off `src`, leaving any body or
/// following request in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderDecoder;

impl Decoder for HeaderDecoder {
    type Item = (RequestHeader, PayloadSize);
    type Error = ParseError;

    /// Attempts to decode a request head from the provided bytes buffer.
    ///
    /// - `Ok(Some((header, payload_size)))` if a complete head was parsed
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if the bytes can never form a valid head
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
        let mut req = httparse::Request::new(&mut headers);

        let parsed_result = req.parse(src.as_ref()).map_err(|e| match e {
            Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
            e => ParseError::invalid_header(e.to_string()),
        });

        match parsed_result? {
            Status::Complete(body_offset) => {
                trace!(head_size = body_offset, "parsed request head");
                ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

                let version = match req.version {
                    Some(0) => http::Version::HTTP_10,
                    Some(1) => http::Version::HTTP_11,
                    // HTTP/2 and HTTP/3 not supported
                    _ => return Err(ParseError::InvalidVersion(req.version)),
                };

                let mut header_builder = Request::builder()
                    .method(req.method.ok_or(ParseError::InvalidMethod)?)
                    .uri(req.path.ok_or(ParseError::InvalidUri)?)
                    .version(version);

                if let Some(header_map) = header_builder.headers_mut() {
                    header_map.reserve(req.headers.len());
                    for header in req.headers.iter() {
                        let name = HeaderName::from_bytes(header.name.as_bytes()).map_err(ParseError::invalid_header)?;
                        let value = HeaderValue::from_bytes(header.value).map_err(ParseError::invalid_header)?;
                        header_map.append(name, value);
                    }
                }

                // the builder only fails on a bad method or uri
                let request = header_builder.body(()).map_err(|e| {
                    if e.is::<http::method::InvalidMethod>() { ParseError::InvalidMethod } else { ParseError::InvalidUri }
                })?;

                let header = RequestHeader::from(request);
                let payload_size = parse_payload(&header)?;

                src.advance(body_offset);
                Ok(Some((header, payload_size)))
            }
            Status::Partial => {
                ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
                Ok(None)
            }
        }
    }
}

/// Determines the payload size from the request headers.
///
/// refer: https://www.rfc-editor.org/rfc/rfc9112.html#name-message-body-length
fn parse_payload(header: &RequestHeader) -> Result<PayloadSize, ParseError> {
    let te_header = header.headers().get(http::header::TRANSFER_ENCODING);
    let cl_header = header.headers().get(http::header::CONTENT_LENGTH);

    match (te_header, cl_header) {
        (None, None) => Ok(PayloadSize::new_empty()),

        (Some(te_value), None) => {
            if is_identity(te_value) {
                Ok(PayloadSize::new_empty())
            } else {
                Err(ParseError::unsupported_transfer_encoding(String::from_utf8_lossy(te_value.as_bytes())))
            }
        }

        (None, Some(_)) => {
            let length = content_length(header.headers())?;

            if !header.need_body() && length > 0 {
                trace!(method = %header.method(), length, "request body on a bodiless method");
            }

            Ok(PayloadSize::new_length(length))
        }

        (Some(_), Some(_)) => Err(ParseError::invalid_content_length("transfer_encoding and content_length both present in headers")),
    }
}

/// Reads `Content-Length`, which may repeat as long as every value is the same
/// plain decimal number.
fn content_length(headers: &HeaderMap) -> Result<u64, ParseError> {
    let mut length = None;

    for value in headers.get_all(http::header::CONTENT_LENGTH) {
        let digits = value.as_bytes().trim_ascii();
        let parsed = (!digits.is_empty() && digits.iter().all(u8::is_ascii_digit))
            .then(|| std::str::from_utf8(digits).ok()?.parse::<u64>().ok())
            .flatten()
            .ok_or_else(|| ParseError::invalid_content_length(format!("value {} is not a decimal u64", String::from_utf8_lossy(digits))))?;

        match length {
            Some(previous) if previous != parsed => {
                return Err(ParseError::invalid_content_length(format!("conflicting values {previous} and {parsed}")));
            }
            _ => length = Some(parsed),
        }
    }

    length.ok_or_else(|| ParseError::invalid_content_length("header is missing"))
}

fn is_identity(header_value: &HeaderValue) -> bool {
    header_value.as_bytes().trim_ascii().eq_ignore_ascii_case(b"identity")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, Version};
    use indoc::indoc;

    #[test]
    fn test_bytes_mut_lens() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        123"##};

        let mut bytes = BytesMut::from(str);

        let mut header_decoder = HeaderDecoder;

        let result = header_decoder.decode(&mut bytes).unwrap();

        assert!(result.is_some());

        assert_eq!(bytes.len(), 3);
        assert_eq!(&bytes[..], &b"123"[..]);
    }

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        "##};

        let mut buf = BytesMut::from(str);

        let (header, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert!(payload_size.is_empty());
        assert!(buf.is_empty());

        assert_eq!(header.method(), &Method::GET);
        assert_eq!(header.version(), Version::HTTP_11);
        assert_eq!(header.uri().path(), "/index.html");
        assert_eq!(header.uri().query(), None);

        assert_eq!(header.headers().len(), 3);
        assert_eq!(header.headers().get(http::header::ACCEPT), Some(&HeaderValue::from_static("*/*")));
        assert_eq!(header.headers().get(http::header::HOST), Some(&HeaderValue::from_static("127.0.0.1:8080")));
        assert_eq!(header.headers().get(http::header::USER_AGENT), Some(&HeaderValue::from_static("curl/7.79.1")));
    }

    #[test]
    fn partial_head_needs_more() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost: local");

        assert!(HeaderDecoder.decode(&mut buf).unwrap().is_none());
        assert_eq!(&buf[..], b"GET / HTTP/1.1\r\nHost: local");
    }

    #[test]
    fn content_length_sets_payload() {
        let mut buf = BytesMut::from("POST /submit HTTP/1.0\r\nContent-Length: 5\r\n\r\nhello");

        let (header, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();

        assert_eq!(header.method(), &Method::POST);
        assert_eq!(header.version(), Version::HTTP_10);
        assert_eq!(payload_size, PayloadSize::Length(5));
        assert_eq!(&buf[..], b"hello");
    }

    #[test]
    fn chunked_is_rejected() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n");

        let err = HeaderDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedTransferEncoding { .. }));
    }

    #[test]
    fn invalid_content_length() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n");

        let err = HeaderDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::InvalidContentLength { .. }));
    }

    #[test]
    fn garbage_is_invalid_header() {
        let mut buf = BytesMut::from("\x01\x02 not http\r\n\r\n");

        let err = HeaderDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::InvalidHeader { .. }));
    }

    #[test]
    fn oversized_partial_head() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\n");
        buf.extend_from_slice(format!("X-Filler: {}\r\n", "a".repeat(MAX_HEADER_BYTES)).as_bytes());

        let err = HeaderDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::TooLargeHeader { .. }));
    }

    #[test]
    fn signed_content_length_is_rejected() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: +5\r\n\r\nhello");

        let err = HeaderDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::InvalidContentLength { .. }));
    }

    #[test]
    fn conflicting_content_lengths_are_rejected() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 5\r\nContent-Length: 6\r\n\r\nhello!");

        let err = HeaderDecoder.decode(&mut buf).unwrap_err();
        assert!(matches!(err, ParseError::InvalidContentLength { .. }));
    }

    #[test]
    fn repeated_content_length_with_one_value() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 5\r\nContent-Length: 5\r\n\r\nhello");

        let (_header, payload_size) = HeaderDecoder.decode(&mut buf).unwrap().unwrap();
        assert_eq!(payload_size, PayloadSize::Length(5));
    }
}
