//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Implementa el subconjunto de HTTP/1.1 que usa el servidor, sin
//! librerías de alto nivel:
//!
//! - Parsing de requests (`request`)
//! - Construcción y serialización de responses (`response`)
//! - Códigos de estado (`status`)
//! - Negociación y compresión del body (`encoding`)
//!
//! Fuera de alcance: chunked transfer encoding, header folding,
//! keep-alive y pipelining. Cada conexión lleva exactamente un
//! request y una response.

pub mod encoding; // Accept-Encoding y gzip
pub mod request; // Parsing de HTTP requests
pub mod response; // Construcción de HTTP responses
pub mod status; // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use encoding::Encoding;
pub use request::{Method, Request};
pub use response::Response;
pub use status::StatusCode;
