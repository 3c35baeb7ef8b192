//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::connection::{DEFAULT_READ_BUFFER_SIZE, DEFAULT_WRITE_BUFFER_SIZE};

/// Which interface the listener binds.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub enum BindMode {
    /// Bind `0.0.0.0` whatever address was configured.
    #[default]
    AllInterfaces,
    /// Bind the configured address.
    Address,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    address: IpAddr,
    port: u16,
    bind_mode: BindMode,
    read_buffer_size: usize,
    write_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
            bind_mode: BindMode::default(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    pub fn new(address: IpAddr, port: u16) -> Self {
        Self { address, port, ..Self::default() }
    }

    pub fn with_bind_mode(mut self, bind_mode: BindMode) -> Self {
        self.bind_mode = bind_mode;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    pub fn with_write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size;
        self
    }

    pub fn bind_mode(&self) -> BindMode {
        self.bind_mode
    }

    pub fn address(&self) -> IpAddr {
        self.address
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    pub fn write_buffer_size(&self) -> usize {
        self.write_buffer_size
    }

    /// The socket address the listener binds, honouring the [`BindMode`].
    pub fn socket_addr(&self) -> SocketAddr {
        match self.bind_mode {
            BindMode::AllInterfaces => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), self.port),
            BindMode::Address => SocketAddr::new(self.address, self.port),
        }
    }
}
