use std::io;
use std::net::SocketAddr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to build the reactor: {source}")]
    Runtime { source: io::Error },

    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },

    #[error("handler must be set")]
    MissingHandler,
}

impl ServerError {
    pub fn runtime<E: Into<io::Error>>(e: E) -> Self {
        Self::Runtime { source: e.into() }
    }

    pub fn bind<E: Into<io::Error>>(addr: SocketAddr, e: E) -> Self {
        Self::Bind { addr, source: e.into() }
    }
}
