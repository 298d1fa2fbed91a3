//! # Raw HTTP Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada: inicializa logging, parsea la configuración y
//! corre el servidor hasta que el proceso termine.

use clap::Parser;
use raw_http_server::config::Config;
use raw_http_server::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raw_http_server=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Crear configuración (CLI o variables de entorno)
    let config = Config::parse();
    config.print_summary();

    let mut server = Server::new(config);

    // Iniciar el servidor (valida la config y bloquea el thread)
    if let Err(e) = server.run() {
        tracing::error!(error = %e, "fatal server error");
        std::process::exit(1);
    }
}
