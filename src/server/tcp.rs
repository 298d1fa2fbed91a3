//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Accept loop de un solo thread que entrega cada conexión a un pool de
//! workers de tamaño fijo. Cada conexión se procesa completa en su
//! worker; lo único compartido es el router (inmutable) detrás de un
//! `Arc`.

use crate::config::Config;
use crate::error::ServerError;
use crate::handlers;
use crate::http::StatusCode;
use crate::router::Router;
use crate::server::connection::{self, Limits};
use crate::server::pool::WorkerPool;
use crate::storage::FileStore;
use std::io::Write;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;

/// Servidor HTTP/1.1
pub struct Server {
    config: Config,
    router: Arc<Router>,
    listener: Option<TcpListener>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        let store = FileStore::new(config.served_directory());
        let router = Router::with_default_routes(store);

        Self {
            config,
            router: Arc::new(router),
            listener: None,
        }
    }

    /// Prepara el directorio servido y abre el socket
    ///
    /// Retorna la dirección real (útil con puerto 0).
    pub fn bind(&mut self) -> Result<SocketAddr, ServerError> {
        self.config.validate().map_err(ServerError::Config)?;

        let directory = self.config.served_directory();
        std::fs::create_dir_all(&directory)?;

        let address = self.config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;
        let local_addr = listener.local_addr()?;

        tracing::info!(
            address = %local_addr,
            directory = %directory.display(),
            "server listening"
        );

        self.listener = Some(listener);
        Ok(local_addr)
    }

    /// Dirección en la que escucha, si ya hizo bind
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Corre el accept loop (bloquea el thread indefinidamente)
    pub fn run(&mut self) -> Result<(), ServerError> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => return Err(ServerError::Config("listener not bound".to_string())),
        };

        let limits = Limits::from_config(&self.config);
        let router = Arc::clone(&self.router);
        let pool = WorkerPool::new(
            self.config.workers,
            self.config.queue_capacity,
            move |stream: TcpStream| {
                if let Err(e) = connection::handle_connection(stream, &router, &limits) {
                    tracing::error!(error = %e, "connection failed");
                }
            },
        )?;

        tracing::info!(workers = pool.size(), "worker pool started");

        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    let peer = stream
                        .peer_addr()
                        .map(|addr| addr.to_string())
                        .unwrap_or_else(|_| "unknown".to_string());
                    tracing::debug!(peer = %peer, "connection accepted");

                    if let Err(stream) = pool.submit(stream) {
                        tracing::warn!(peer = %peer, "worker queue full, rejecting connection");
                        Self::reject_busy(stream, &limits);
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to accept connection");
                }
            }
        }

        Ok(())
    }

    /// Responde 503 desde el accept loop sin leer el request
    fn reject_busy(mut stream: TcpStream, limits: &Limits) {
        let response = handlers::status_response(StatusCode::ServiceUnavailable);
        let _ = stream.set_write_timeout(Some(limits.write_timeout));
        let _ = stream.write_all(&response.to_bytes());
    }
}
