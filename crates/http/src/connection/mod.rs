//! HTTP connection handling module
//!
//! - [`HttpConnection`]: the per-connection state machine
//!   (read → parse → dispatch → write → read again)
//! - [`ConnectionState`]: the states it moves through
//! - [`ConnectionRegistry`] / [`ConnectionSlot`]: exactly-once accounting of
//!   live connections

mod http_connection;
mod registry;
mod state;

pub use http_connection::{DEFAULT_READ_BUFFER_SIZE, DEFAULT_WRITE_BUFFER_SIZE, HttpConnection};
pub use registry::{ConnectionId, ConnectionRegistry, ConnectionSlot, RegistryStats};
pub use state::ConnectionState;
