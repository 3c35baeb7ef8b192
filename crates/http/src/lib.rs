//! A single-threaded keep-alive HTTP server core
//!
//! Every accepted connection runs a small state machine on one reactor
//! thread: read the bytes the socket has, parse until a whole request is
//! buffered, let the handler fill in a response body, write the response and,
//! since every response is keep-alive, go back to reading.
//!
//! # Example
//!
//! ```no_run
//! use nano_http::handler::make_handler;
//! use nano_http::protocol::Response;
//! use nano_http::server::{Server, ServerConfig};
//!
//! let config = ServerConfig::new("0.0.0.0".parse().unwrap(), 12345);
//! let server = Server::builder()
//!     .config(config)
//!     .handler(make_handler(|response: &mut Response| response.set_body("hello world\n")))
//!     .build()
//!     .unwrap();
//!
//! if let Err(e) = server.run() {
//!     eprintln!("{e}");
//! }
//! ```
//!
//! # Architecture
//!
//! - [`scheduler`]: the reactor context; runs connection tasks and deferred tasks on one thread
//! - [`server`]: configuration, the [`server::Listener`] and the [`server::Server`] facade
//! - [`connection`]: the per-connection state machine and the registry of live connections
//! - [`codec`]: request framing and response serialization
//! - [`handler`]: the [`handler::Handler`] extension point
//! - [`protocol`]: request/response types and errors
//!
//! # Wire format
//!
//! Every response is `HTTP/1.0 200 OK` with `Connection: keep-alive` and a
//! `Content-Length` equal to the body length. A handler that panics gets its
//! connection answered with a body-less `500` and closed.
//!
//! # Limitations
//!
//! - Bodies are framed by `Content-Length` only, chunked requests are rejected
//! - One request in flight per connection; queued requests are answered in order
//! - No TLS, no routing, no idle timeout
//! - Maximum header size: 8KB
//! - Maximum number of headers: 64

pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;
pub mod scheduler;
pub mod server;

mod utils;
pub(crate) use utils::{ensure, panic_message};
