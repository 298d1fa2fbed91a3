//! # Negociación de Contenido
//! src/http/encoding.rs
//!
//! Decide si el body de una respuesta se comprime según el header
//! `Accept-Encoding` del cliente, y aplica la compresión.
//!
//! Política: `gzip` si aparece en cualquier posición de la lista del
//! cliente, `identity` en otro caso. Después de comprimir, el
//! `Content-Length` se recalcula siempre sobre el body final.

use super::Response;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Write};

/// Codificaciones de contenido reconocidas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// Sin transformación
    Identity,

    /// DEFLATE con framing gzip (RFC 1952)
    Gzip,
}

impl Encoding {
    /// Parsea un token de `Accept-Encoding` (ya recortado)
    ///
    /// Retorna `None` para tokens desconocidos (`br`, `deflate`, `*`, ...).
    /// Los parámetros de calidad (`gzip;q=0.8`) se ignoran.
    pub fn from_token(token: &str) -> Option<Self> {
        let name = token.split(';').next().unwrap_or("").trim();
        match name.to_ascii_lowercase().as_str() {
            "gzip" => Some(Encoding::Gzip),
            "identity" => Some(Encoding::Identity),
            _ => None,
        }
    }

    /// Parsea el valor completo de `Accept-Encoding`
    ///
    /// Mantiene el orden de izquierda a derecha y descarta duplicados y
    /// tokens no reconocidos.
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http_server::http::Encoding;
    ///
    /// let list = Encoding::parse_list("br, GZIP , invalid");
    /// assert_eq!(list, vec![Encoding::Gzip]);
    /// ```
    pub fn parse_list(value: &str) -> Vec<Self> {
        let mut list = Vec::new();
        for encoding in value.split(',').filter_map(Self::from_token) {
            if !list.contains(&encoding) {
                list.push(encoding);
            }
        }
        list
    }

    /// Valor del header `Content-Encoding`, o `None` para identity
    pub fn header_value(&self) -> Option<&'static str> {
        match self {
            Encoding::Identity => None,
            Encoding::Gzip => Some("gzip"),
        }
    }
}

/// Elige la codificación de la respuesta
pub fn negotiate(accepted: &[Encoding]) -> Encoding {
    if accepted.contains(&Encoding::Gzip) {
        Encoding::Gzip
    } else {
        Encoding::Identity
    }
}

/// Comprime un body con la codificación elegida
///
/// Retorna el nuevo body y el valor de `Content-Encoding` a emitir
/// (ausente para identity).
pub fn compress(body: &[u8], encoding: Encoding) -> io::Result<(Vec<u8>, Option<&'static str>)> {
    match encoding {
        Encoding::Identity => Ok((body.to_vec(), None)),
        Encoding::Gzip => {
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(body)?;
            let compressed = encoder.finish()?;
            Ok((compressed, encoding.header_value()))
        }
    }
}

/// Aplica la codificación a una respuesta completa
///
/// Reemplaza el body, agrega `Content-Encoding` si corresponde y deja
/// `Content-Length` igual al tamaño final en bytes. Las respuestas sin
/// body quedan sin tocar.
pub fn apply(response: Response, encoding: Encoding) -> io::Result<Response> {
    if response.body().is_empty() {
        return Ok(response);
    }

    let (body, content_encoding) = compress(response.body(), encoding)?;
    let mut response = response.with_body_bytes(body);
    if let Some(value) = content_encoding {
        response.add_header("Content-Encoding", value);
    }
    Ok(response)
}
