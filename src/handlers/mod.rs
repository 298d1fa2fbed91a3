//! # Handlers
//! src/handlers/mod.rs
//!
//! Un handler por endpoint lógico. Cada uno es una función libre que
//! recibe el contexto de la ruta y construye una `Response` nueva; ningún
//! handler toca los headers del request.
//!
//! ## Endpoints
//!
//! - **basic**: `GET /`, `GET /echo/<value>`, `GET /user-agent`
//! - **files**: `GET /files/<name>`, `POST /files/<name>`
//!
//! La negociación de contenido la aplica el router después, de forma
//! uniforme para todas las respuestas (incluida la de 404).

pub mod basic;
pub mod files;

pub use basic::*;
pub use files::*;

use crate::error::{HandlerError, ParseError, StoreError};
use crate::http::{Request, Response, StatusCode};
use crate::storage::FileStore;

/// Lo que un handler necesita para construir su respuesta
pub struct Context<'a> {
    /// Request parseado (solo lectura)
    pub request: &'a Request,

    /// Resto del path después del prefijo de la ruta
    pub tail: &'a str,

    /// Directorio servido
    pub store: &'a FileStore,
}

/// Tipo de función handler
pub type Handler = fn(&Context<'_>) -> Result<Response, HandlerError>;

/// Body fijo del 404
pub const NOT_FOUND_BODY: &str = "404 Not Found";

/// Handler terminal para rutas sin match; nunca falla
pub fn not_found() -> Response {
    Response::text(StatusCode::NotFound, NOT_FOUND_BODY)
}

/// Respuesta `text/plain` cuyo body es la status line sin versión
///
/// Ej: `400 Bad Request`. No incluye detalles internos del error.
pub fn status_response(status: StatusCode) -> Response {
    if status == StatusCode::NotFound {
        return not_found();
    }
    Response::text(status, &status.to_string())
}

/// Convierte el error de un handler en una respuesta
///
/// - archivo inexistente → 404 (handler de not-found)
/// - path fuera del directorio servido → 400
/// - error de I/O → 500, el detalle solo va al log
pub fn error_response(err: &HandlerError) -> Response {
    match err {
        HandlerError::Store(StoreError::NotFound(_)) => not_found(),
        HandlerError::Store(StoreError::InvalidPath(name)) => {
            tracing::warn!(name = %name, "rejected file path");
            status_response(StatusCode::BadRequest)
        }
        HandlerError::Store(StoreError::Io(e)) => {
            tracing::error!(error = %e, "file store I/O failure");
            status_response(StatusCode::InternalServerError)
        }
    }
}

/// Respuesta para un request que no se pudo parsear
pub fn parse_error_response(err: &ParseError) -> Response {
    match err {
        ParseError::UnsupportedMethod(_) => status_response(StatusCode::MethodNotAllowed),
        ParseError::EmptyRequest
        | ParseError::MalformedRequest(_)
        | ParseError::MalformedHeader(_)
        | ParseError::InvalidContentLength(_)
        | ParseError::IncompleteBody { .. } => status_response(StatusCode::BadRequest),
    }
}
