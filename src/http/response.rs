//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas HTTP/1.1 de forma programática y
//! convertirlas a bytes para enviar al cliente.
//!
//! ## Formato de una respuesta HTTP/1.1
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 2\r\n
//! \r\n
//! OK
//! ```
//!
//! Los headers se serializan en orden de inserción y el body se copia
//! byte a byte, sin asumir que sea texto.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use raw_http_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body("OK");
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use super::StatusCode;
use crate::error::ParseError;

/// Representa una respuesta HTTP/1.1 completa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers en orden de inserción, con el nombre tal como se agregó.
    /// Un nombre repetido (sin distinguir mayúsculas) reemplaza el valor
    /// sin mover la posición.
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta con el código de estado especificado
    ///
    /// Por defecto, la respuesta no tiene headers ni body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta
    ///
    /// Si el header ya existe, se sobrescribe.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el cuerpo de la respuesta desde un string
    ///
    /// Automáticamente calcula y agrega el header `Content-Length`.
    pub fn with_body(self, body: &str) -> Self {
        self.with_body_bytes(body.as_bytes().to_vec())
    }

    /// Establece el cuerpo de la respuesta desde bytes
    ///
    /// Útil para respuestas binarias (archivos, bodies comprimidos, etc.)
    pub fn with_body_bytes(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        let length = self.body.len().to_string();
        self.add_header("Content-Length", &length);
        self
    }

    /// Crea una respuesta `text/plain` con el body dado
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http_server::http::{Response, StatusCode};
    ///
    /// let response = Response::text(StatusCode::NotFound, "404 Not Found");
    /// assert_eq!(response.header("content-length"), Some("13"));
    /// ```
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain")
            .with_body(body)
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`, en orden de inserción
    /// - Línea vacía: `\r\n`
    /// - Body: contenido binario
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(64 + self.body.len());

        let status_line = format!("HTTP/1.1 {}\r\n", self.status);
        result.extend_from_slice(status_line.as_bytes());

        for (name, value) in &self.headers {
            let header_line = format!("{}: {}\r\n", name, value);
            result.extend_from_slice(header_line.as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Parsea una respuesta desde bytes de la red
    ///
    /// Inverso de [`Response::to_bytes`]. Si hay `Content-Length`, el body
    /// es exactamente esa cantidad de bytes; si no, todo lo que sigue a la
    /// línea vacía.
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http_server::http::{Response, StatusCode};
    ///
    /// let original = Response::text(StatusCode::Ok, "hi");
    /// let parsed = Response::parse(&original.to_bytes()).unwrap();
    /// assert_eq!(parsed, original);
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let head_end = super::request::head_len(buffer)
            .ok_or_else(|| ParseError::MalformedRequest("missing header terminator".to_string()))?;
        let head = std::str::from_utf8(&buffer[..head_end])
            .map_err(|_| ParseError::MalformedRequest("status line is not UTF-8".to_string()))?;

        let mut lines = head.lines();
        let status_line = lines.next().unwrap_or("");
        let mut parts = status_line.splitn(3, ' ');
        let version = parts.next().unwrap_or("");
        if !version.starts_with("HTTP/") {
            return Err(ParseError::MalformedRequest(status_line.to_string()));
        }
        let code: u16 = parts
            .next()
            .and_then(|c| c.parse().ok())
            .ok_or_else(|| ParseError::MalformedRequest(status_line.to_string()))?;

        let mut response = Response::new(StatusCode::from_u16(code));
        for line in lines.take_while(|l| !l.is_empty()) {
            let (name, value) = line
                .split_once(": ")
                .ok_or_else(|| ParseError::MalformedHeader(line.to_string()))?;
            response.add_header(name, value.trim());
        }

        let rest = &buffer[head_end..];
        response.body = match response.header("Content-Length") {
            Some(value) => {
                let length: usize = value
                    .parse()
                    .map_err(|_| ParseError::InvalidContentLength(value.to_string()))?;
                if rest.len() < length {
                    return Err(ParseError::IncompleteBody {
                        expected: length,
                        received: rest.len(),
                    });
                }
                rest[..length].to_vec()
            }
            None => rest.to_vec(),
        };

        Ok(response)
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene los headers en orden de inserción
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Obtiene un header sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
