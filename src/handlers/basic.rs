//! # Handlers Básicos
//! src/handlers/basic.rs
//!
//! - `GET /`: responde "OK"
//! - `GET /echo/<value>`: devuelve `<value>` decodificado (%XX)
//! - `GET /user-agent`: devuelve el header `User-Agent`

use super::Context;
use crate::error::HandlerError;
use crate::http::request::percent_decode;
use crate::http::{Response, StatusCode};

/// Body de `/user-agent` cuando el cliente no manda el header
pub const USER_AGENT_FALLBACK: &str = "No User-Agent found";

/// Handler para `GET /`
pub fn root_handler(_ctx: &Context<'_>) -> Result<Response, HandlerError> {
    Ok(Response::text(StatusCode::Ok, "OK"))
}

/// Handler para `GET /echo/<value>`
///
/// El valor se decodifica antes de devolverlo: `hello%20world` →
/// `hello world`, `a%2Fb` → `a/b`. El body puede no ser UTF-8.
pub fn echo_handler(ctx: &Context<'_>) -> Result<Response, HandlerError> {
    let body = percent_decode(ctx.tail);
    Ok(Response::new(StatusCode::Ok)
        .with_header("Content-Type", "text/plain")
        .with_body_bytes(body))
}

/// Handler para `GET /user-agent`
pub fn user_agent_handler(ctx: &Context<'_>) -> Result<Response, HandlerError> {
    let user_agent = ctx
        .request
        .header("user-agent")
        .unwrap_or(USER_AGENT_FALLBACK);
    Ok(Response::text(StatusCode::Ok, user_agent))
}
