//! # Raw HTTP Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo implementado directamente sobre sockets
//! TCP, sin librerías HTTP de alto nivel.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: parsing de requests, serialización de responses, gzip
//! - `router`: tabla de rutas y despacho a handlers
//! - `handlers`: un handler por endpoint (`/`, `/echo`, `/user-agent`, `/files`)
//! - `storage`: el directorio servido como almacén de bytes
//! - `server`: accept loop, pool de workers y ciclo de vida de la conexión
//! - `config`: argumentos CLI y variables de entorno
//! - `error`: tipos de error de cada capa
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use raw_http_server::config::Config;
//! use raw_http_server::server::Server;
//!
//! let config = Config::default();
//! let mut server = Server::new(config);
//! server.run().expect("Error al iniciar servidor");
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
pub mod storage;
