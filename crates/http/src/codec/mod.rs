//! HTTP codec module for framing requests and serializing responses
//!
//! - Request side:
//!   - [`RequestDecoder`]: frames whole request messages, persistent per connection
//!   - [`RequestParser`]: one parse pass with a message-complete callback
//!   - head parsing via the `header` module
//!
//! - Response side:
//!   - [`ResponseEncoder`]: serializes a [`Response`](crate::protocol::Response)
//!   - [`encode_response`]: standalone, pure serialization
//!
//! # Example
//!
//! ```
//! use nano_http::codec::{RequestParser, encode_response};
//! use nano_http::protocol::Response;
//! use bytes::BytesMut;
//!
//! let mut parser = RequestParser::new();
//! let mut input = BytesMut::from("GET / HTTP/1.1\r\n\r\n");
//! let mut completed = 0;
//! parser.execute(&mut input, |_header| completed += 1).unwrap();
//! assert_eq!(completed, 1);
//!
//! let mut response = Response::new();
//! response.set_body("hello world\n");
//! let bytes = encode_response(&response).unwrap();
//! assert!(bytes.starts_with(b"HTTP/1.0 200 OK\n"));
//! ```

mod header;
mod request_decoder;
mod request_parser;
mod response_encoder;

pub use header::HeaderDecoder;
pub use request_decoder::RequestDecoder;
pub use request_parser::{ParseStatus, RequestParser};
pub use response_encoder::{ResponseEncoder, encode_response};
