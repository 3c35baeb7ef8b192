//! Server assembly: configuration, the listener and the [`Server`] facade
//! that wires them onto a [`Scheduler`].

mod config;
mod error;
mod listener;

pub use config::{BindMode, ServerConfig};
pub use error::ServerError;
pub use listener::Listener;

use std::fmt;
use std::rc::Rc;

use crate::connection::ConnectionRegistry;
use crate::handler::Handler;
use crate::scheduler::{Scheduler, SchedulerHandle};

pub struct ServerBuilder {
    config: Option<ServerConfig>,
    handler: Option<Rc<dyn Handler>>,
}

impl fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerBuilder").field("config", &self.config).field("has_handler", &self.handler.is_some()).finish()
    }
}

impl ServerBuilder {
    fn new() -> Self {
        Self { config: None, handler: None }
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Rc::new(handler));
        self
    }

    pub fn build(self) -> Result<Server, ServerError> {
        let handler = self.handler.ok_or(ServerError::MissingHandler)?;
        Ok(Server { config: self.config.unwrap_or_default(), handler })
    }
}

pub struct Server {
    config: ServerConfig,
    handler: Rc<dyn Handler>,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Builds the reactor, binds the listener and serves on the calling thread.
    ///
    /// Only returns if the reactor can't be built or the bind fails.
    pub fn run(self) -> Result<(), ServerError> {
        let mut scheduler = Scheduler::new()?;
        let listener = scheduler.run_until(Listener::from_config(&self.config))?;

        let handle = scheduler.handle();
        scheduler.spawn(listener.serve(self.handler, handle, ConnectionRegistry::new()));
        scheduler.run_forever()
    }

    /// Binds and serves on an existing scheduler.
    pub async fn serve(self, scheduler: SchedulerHandle, registry: ConnectionRegistry) -> Result<(), ServerError> {
        let listener = Listener::from_config(&self.config).await?;
        listener.serve(self.handler, scheduler, registry).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::make_handler;
    use crate::protocol::Response;

    #[test]
    fn build_requires_handler() {
        let result = Server::builder().config(ServerConfig::default()).build();

        assert!(matches!(result, Err(ServerError::MissingHandler)));
    }

    #[test]
    fn build_with_default_config() {
        let server = Server::builder().handler(make_handler(|response: &mut Response| response.set_body("ok"))).build().unwrap();

        assert_eq!(server.config(), &ServerConfig::default());
    }

    #[test]
    fn bind_failure_is_reported() {
        let mut scheduler = Scheduler::new().unwrap();

        let result = scheduler.run_until(async {
            let first = Listener::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
            let taken = first.local_addr();
            Listener::bind(taken).await.map(|_listener| ())
        });

        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }

    #[test]
    fn run_stops_when_the_port_is_taken() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();

        let config = ServerConfig::new("127.0.0.1".parse().unwrap(), port).with_bind_mode(BindMode::Address);
        let server = Server::builder().config(config).handler(make_handler(|response: &mut Response| response.set_body("ok"))).build().unwrap();

        assert!(matches!(server.run(), Err(ServerError::Bind { .. })));
    }
}
