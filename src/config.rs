//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./raw_http_server --directory /tmp/files --port 4221 --workers 16
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_DIRECTORY=/srv/files ./raw_http_server
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Configuración del servidor HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "raw_http_server")]
#[command(about = "Servidor HTTP/1.1 mínimo sobre sockets TCP")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Host/IP en el que escucha
    #[arg(long, default_value = "localhost", env = "HTTP_HOST")]
    pub host: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "4221", env = "HTTP_PORT")]
    pub port: u16,

    /// Directorio servido por /files/<name> (por defecto, el temporal del sistema)
    #[arg(long, env = "HTTP_DIRECTORY")]
    pub directory: Option<PathBuf>,

    // === Workers ===
    /// Número fijo de workers que atienden conexiones
    #[arg(long, default_value = "8", env = "HTTP_WORKERS")]
    pub workers: usize,

    /// Conexiones aceptadas que pueden esperar un worker libre
    #[arg(long = "queue-capacity", default_value = "128", env = "HTTP_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    // === Timeouts ===
    /// Deadline de lectura por conexión, en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "10000", env = "HTTP_READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Deadline de escritura por conexión, en milisegundos
    #[arg(long = "write-timeout-ms", default_value = "10000", env = "HTTP_WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,

    // === Límites ===
    /// Tamaño máximo de request line + headers
    #[arg(long = "max-header-bytes", default_value = "8192", env = "HTTP_MAX_HEADER_BYTES")]
    pub max_header_bytes: usize,

    /// Content-Length máximo aceptado
    #[arg(long = "max-body-bytes", default_value = "10485760", env = "HTTP_MAX_BODY_BYTES")]
    pub max_body_bytes: usize,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use raw_http_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "localhost:4221");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Directorio servido efectivo
    pub fn served_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        if self.queue_capacity == 0 {
            return Err("Queue capacity must be >= 1".to_string());
        }

        // Un timeout de 0 en std::net significa error, no "sin límite"
        if self.read_timeout_ms == 0 {
            return Err("Read timeout must be > 0".to_string());
        }
        if self.write_timeout_ms == 0 {
            return Err("Write timeout must be > 0".to_string());
        }

        if self.max_header_bytes == 0 {
            return Err("Max header bytes must be >= 1".to_string());
        }

        Ok(())
    }

    /// Registra un resumen de la configuración
    pub fn print_summary(&self) {
        tracing::info!(
            address = %self.address(),
            directory = %self.served_directory().display(),
            "network"
        );
        tracing::info!(
            workers = self.workers,
            queue_capacity = self.queue_capacity,
            "worker pool"
        );
        tracing::info!(
            read_timeout_ms = self.read_timeout_ms,
            write_timeout_ms = self.write_timeout_ms,
            max_header_bytes = self.max_header_bytes,
            max_body_bytes = self.max_body_bytes,
            "limits"
        );
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 4221,
            directory: None,
            workers: 8,
            queue_capacity: 128,
            read_timeout_ms: 10_000,
            write_timeout_ms: 10_000,
            max_header_bytes: 8192,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}
