//! # Errores del Servidor
//! src/error.rs
//!
//! Taxonomía de errores del servidor. Cada capa tiene su propio enum:
//!
//! - `ParseError`: bytes del request que no forman un request válido
//! - `StoreError`: fallos del directorio servido (lectura/escritura)
//! - `HandlerError`: errores que un handler devuelve al router
//! - `ServerError`: fallos de arranque (bind, configuración)
//!
//! Los errores de parsing y de handlers nunca tumban al worker: el router
//! y la conexión los convierten en una respuesta HTTP.

use std::io;
use thiserror::Error;

/// Errores que pueden ocurrir durante el parsing de un request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Request vacío
    #[error("Empty request")]
    EmptyRequest,

    /// Request line ilegible (menos de 2 tokens, bytes no UTF-8, etc.)
    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    /// Método HTTP no soportado
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Línea de header sin separador `": "`
    #[error("Malformed header: {0}")]
    MalformedHeader(String),

    /// `Content-Length` que no es un entero no negativo
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// Llegaron menos bytes de body que los declarados en `Content-Length`
    #[error("Incomplete body: expected {expected} bytes, got {received}")]
    IncompleteBody { expected: usize, received: usize },
}

/// Errores del almacén de archivos (directorio servido)
#[derive(Debug, Error)]
pub enum StoreError {
    /// El archivo pedido no existe
    #[error("File not found: {0}")]
    NotFound(String),

    /// El nombre escapa del directorio servido o es inválido
    #[error("Invalid file path: {0}")]
    InvalidPath(String),

    /// Error de I/O (permisos, disco lleno, ...)
    #[error("File I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Errores que un handler puede devolver al router
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errores fatales de arranque del servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
