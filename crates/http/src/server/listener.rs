use std::net::SocketAddr;
use std::rc::Rc;

use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::connection::{ConnectionRegistry, DEFAULT_READ_BUFFER_SIZE, DEFAULT_WRITE_BUFFER_SIZE, HttpConnection};
use crate::handler::Handler;
use crate::scheduler::{Scheduler, SchedulerHandle};
use crate::server::{ServerConfig, ServerError};

/// A bound TCP listener that turns every accepted socket into a started
/// [`HttpConnection`].
#[derive(Debug)]
pub struct Listener {
    tcp_listener: TcpListener,
    local_addr: SocketAddr,
    read_buffer_size: usize,
    write_buffer_size: usize,
}

impl Listener {
    /// Binds `addr` once; there is no retry and no port probing.
    pub async fn bind(addr: SocketAddr) -> Result<Self, ServerError> {
        let tcp_listener = match TcpListener::bind(addr).await {
            Ok(tcp_listener) => tcp_listener,
            Err(e) => {
                error!(port = addr.port(), cause = %e, "server failed at starting");
                return Err(ServerError::bind(addr, e));
            }
        };

        let local_addr = tcp_listener.local_addr().map_err(|e| ServerError::bind(addr, e))?;
        info!(port = local_addr.port(), method = Scheduler::backend_method(), "server has started");

        Ok(Self {
            tcp_listener,
            local_addr,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
        })
    }

    /// Binds the address derived from `config` and applies its buffer sizes.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let mut listener = Self::bind(config.socket_addr()).await?;
        listener.read_buffer_size = config.read_buffer_size();
        listener.write_buffer_size = config.write_buffer_size();
        Ok(listener)
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections forever.
    ///
    /// The listener keeps no reference to the connections it starts.
    pub async fn serve<H>(self, handler: Rc<H>, scheduler: SchedulerHandle, registry: ConnectionRegistry)
    where
        H: Handler + ?Sized + 'static,
    {
        loop {
            let (tcp_stream, remote_addr) = match self.tcp_listener.accept().await {
                Ok(stream_and_addr) => stream_and_addr,
                Err(e) => {
                    warn!(cause = %e, "failed to accept");
                    continue;
                }
            };

            let slot = registry.register(Some(remote_addr));
            debug!(id = %slot.id(), %remote_addr, "accepted connection");

            HttpConnection::with_capacity(
                tcp_stream,
                Rc::clone(&handler),
                scheduler.clone(),
                slot,
                self.read_buffer_size,
                self.write_buffer_size,
            )
            .start();
        }
    }
}
