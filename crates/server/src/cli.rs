//! Command line arguments.

use std::net::IpAddr;

use clap::Parser;
use nano_http::server::{BindMode, ServerConfig};
use tracing::Level;

/// Keep-alive HTTP server answering every request with `hello world`
#[derive(Debug, Clone, Parser)]
#[command(name = "nano-server", version)]
#[command(after_help = "Example:\n  nano-server 0.0.0.0 12345")]
pub struct Cli {
    /// Interface address; only bound with --bind-address
    pub address: IpAddr,

    /// TCP port to listen on
    pub port: u16,

    /// Bind ADDRESS instead of every interface
    #[arg(long)]
    pub bind_address: bool,

    /// Maximum log level
    #[arg(long, default_value = "info", env = "NANO_LOG_LEVEL")]
    pub log_level: Level,
}

impl Cli {
    pub fn server_config(&self) -> ServerConfig {
        let bind_mode = if self.bind_address { BindMode::Address } else { BindMode::AllInterfaces };
        ServerConfig::new(self.address, self.port).with_bind_mode(bind_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;

    #[test]
    fn two_positionals_are_required() {
        Cli::try_parse_from(["nano-server", "onlyOneArg"]).unwrap_err();
        Cli::try_parse_from(["nano-server"]).unwrap_err();
        Cli::try_parse_from(["nano-server", "0.0.0.0", "12345", "extra"]).unwrap_err();
    }

    #[test]
    fn port_must_be_a_number() {
        Cli::try_parse_from(["nano-server", "0.0.0.0", "http"]).unwrap_err();
    }

    #[test]
    fn binds_all_interfaces_by_default() {
        let cli = Cli::try_parse_from(["nano-server", "127.0.0.1", "12345"]).unwrap();

        assert_eq!(cli.log_level, Level::INFO);
        assert_eq!(cli.server_config().socket_addr(), "0.0.0.0:12345".parse::<SocketAddr>().unwrap());
    }

    #[test]
    fn bind_address_flag() {
        let cli = Cli::try_parse_from(["nano-server", "127.0.0.1", "12345", "--bind-address", "--log-level", "debug"]).unwrap();

        assert_eq!(cli.log_level, Level::DEBUG);
        assert_eq!(cli.server_config().socket_addr(), "127.0.0.1:12345".parse::<SocketAddr>().unwrap());
    }
}
