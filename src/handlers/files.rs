//! # Handlers de Archivos
//! src/handlers/files.rs
//!
//! - `GET /files/<name>`: lee el archivo del directorio servido
//! - `POST /files/<name>`: escribe el body del request en el archivo
//!
//! El nombre se toma tal cual del path (sin decodificar) y se confina
//! al directorio servido por `FileStore`.

use super::Context;
use crate::error::HandlerError;
use crate::http::{Response, StatusCode};

/// Handler para `GET /files/<name>`
///
/// Archivo inexistente → `StoreError::NotFound` (el router responde 404).
pub fn file_get_handler(ctx: &Context<'_>) -> Result<Response, HandlerError> {
    let contents = ctx.store.read(ctx.tail)?;
    tracing::debug!(name = %ctx.tail, bytes = contents.len(), "file read");

    Ok(Response::new(StatusCode::Ok)
        .with_header("Content-Type", "application/octet-stream")
        .with_body_bytes(contents))
}

/// Handler para `POST /files/<name>`
///
/// Crea o reemplaza el archivo con el body del request y responde
/// 201 con body vacío.
pub fn file_put_handler(ctx: &Context<'_>) -> Result<Response, HandlerError> {
    ctx.store.write(ctx.tail, ctx.request.body())?;
    tracing::debug!(name = %ctx.tail, bytes = ctx.request.body().len(), "file written");

    Ok(Response::new(StatusCode::Created).with_body_bytes(Vec::new()))
}
