//! Request head parsing.
//!
//! [`HeaderDecoder`] turns the bytes of a request line and header section into
//! a [`RequestHeader`](crate::protocol::RequestHeader) and tells the request
//! decoder how many body bytes follow.

mod header_decoder;

pub use header_decoder::HeaderDecoder;
