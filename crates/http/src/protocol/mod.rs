//! Core HTTP protocol types.
//!
//! - [`RequestHeader`]: the parsed request line and headers
//! - [`PayloadSize`]: how many body bytes follow a request head
//! - [`Response`]: the body a handler fills in
//! - [`HttpError`], [`ParseError`], [`SendError`]: connection level errors

mod payload;
pub use payload::PayloadSize;

mod request;
pub use request::RequestHeader;

mod response;
pub use response::Response;

mod error;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
