//! mini-ftpd - Entry Point
//!
//! A minimal active-mode FTP server: `mini-ftpd <port>`.

use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use mini_ftpd::Server;
use mini_ftpd::cli::Cli;
use mini_ftpd::config::ServerConfig;
use mini_ftpd::utils::logging::setup_logging;

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    // Bad or missing arguments print usage but are not a failure.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
    };

    let mut config = match ServerConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("mini-ftpd: invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    config.control_port = cli.port;

    info!("Launching FTP server...");

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            eprintln!("mini-ftpd: {}", e);
            return ExitCode::FAILURE;
        }
    };

    server.serve().await;
    ExitCode::SUCCESS
}
