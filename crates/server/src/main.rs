use std::process::ExitCode;

use clap::Parser;
use nano_http::handler::make_handler;
use nano_http::protocol::Response;
use nano_http::server::Server;
use tracing::error;
use tracing_subscriber::FmtSubscriber;

mod cli;

use cli::Cli;

fn hello_world(response: &mut Response) {
    response.set_body("hello world\n");
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(cli.log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
    }

    let server = match Server::builder().config(cli.server_config()).handler(make_handler(hello_world)).build() {
        Ok(server) => server,
        Err(e) => {
            error!(cause = %e, "invalid server setup");
            return ExitCode::FAILURE;
        }
    };

    match server.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(cause = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}
