//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parser HTTP/1.1 desde cero, sobre el subconjunto que usa el servidor.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /files/notes.txt HTTP/1.1\r\n
//! Host: localhost:4221\r\n
//! Content-Length: 5\r\n
//! Accept-Encoding: gzip, br\r\n
//! \r\n
//! hello
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD /target HTTP/1.1` (la versión es opcional)
//! 2. **Headers**: pares `Name: Value`; el nombre se guarda en minúsculas
//!    y un header repetido se queda con el último valor
//! 3. **Empty Line**: `\r\n` que separa headers del body
//! 4. **Body**: bytes crudos, recortados a `Content-Length` si viene
//!
//! Como degradación se aceptan terminadores `\n` sin `\r`.
//! Una línea de header sin `": "` es un error (`MalformedHeader`), no se
//! descarta en silencio.

use super::Encoding;
use crate::error::ParseError;
use std::collections::HashMap;

/// Versión que se asume si la request line no la trae
const DEFAULT_VERSION: &str = "HTTP/1.1";

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
}

impl Method {
    /// Parsea un método HTTP (distingue mayúsculas)
    ///
    /// # Errores
    ///
    /// Retorna `UnsupportedMethod` si el método no es soportado
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        match s {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }

    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
        }
    }
}

/// Representa un request HTTP parseado
///
/// Inmutable después del parsing: los handlers construyen sus propios
/// headers de respuesta.
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Request-URI tal cual llegó (puede incluir `?query`)
    target: String,

    /// Versión HTTP (por defecto "HTTP/1.1")
    version: String,

    /// Headers con nombre en minúsculas (ej: {"user-agent": "curl/8.0"})
    headers: HashMap<String, String>,

    /// Body crudo
    body: Vec<u8>,

    /// Codificaciones reconocidas de `Accept-Encoding`, en orden
    accepted_encodings: Vec<Encoding>,
}

impl Request {
    /// Parsea un request HTTP desde bytes
    ///
    /// El buffer debe contener el request completo: si trae
    /// `Content-Length`, el body debe haber llegado entero.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use raw_http_server::http::{Method, Request};
    ///
    /// let raw = b"GET /echo/abc?x=1 HTTP/1.1\r\nUser-Agent: curl\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), Method::GET);
    /// assert_eq!(request.path(), "/echo/abc");
    /// assert_eq!(request.header("User-Agent"), Some("curl"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(ParseError::EmptyRequest);
        }

        // Sin línea vacía todo el buffer es cabecera y no hay body
        let (head, body) = match head_len(buffer) {
            Some(end) => (&buffer[..end], &buffer[end..]),
            None => (buffer, &buffer[buffer.len()..]),
        };

        let head = std::str::from_utf8(head)
            .map_err(|_| ParseError::MalformedRequest("request head is not UTF-8".to_string()))?;

        let mut lines = head.lines();
        let request_line = lines.next().unwrap_or("");
        let (method, target, version) = Self::parse_request_line(request_line)?;
        let headers = Self::parse_headers(lines)?;

        let body = match Self::content_length(&headers)? {
            Some(expected) if body.len() < expected => {
                return Err(ParseError::IncompleteBody {
                    expected,
                    received: body.len(),
                });
            }
            // Lo que sobra después del body declarado se descarta (sin pipelining)
            Some(expected) => body[..expected].to_vec(),
            None => body.to_vec(),
        };

        let accepted_encodings = headers
            .get("accept-encoding")
            .map(|value| Encoding::parse_list(value))
            .unwrap_or_default();

        Ok(Request {
            method,
            target,
            version,
            headers,
            body,
            accepted_encodings,
        })
    }

    /// Parsea la request line (primera línea del request)
    ///
    /// Formato: `GET /path?query HTTP/1.1`
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // METHOD y TARGET son obligatorios, VERSION no
        if parts.len() < 2 {
            return Err(ParseError::MalformedRequest(line.to_string()));
        }

        let method = Method::parse(parts[0])?;
        let target = parts[1].to_string();
        let version = parts.get(2).copied().unwrap_or(DEFAULT_VERSION).to_string();

        Ok((method, target, version))
    }

    /// Parsea los headers hasta la primera línea vacía
    ///
    /// Cada header tiene formato: "Name: Value"
    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            if line.is_empty() {
                break;
            }

            let (name, value) = line
                .split_once(": ")
                .ok_or_else(|| ParseError::MalformedHeader(line.to_string()))?;
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }

        Ok(headers)
    }

    fn content_length(headers: &HashMap<String, String>) -> Result<Option<usize>, ParseError> {
        headers
            .get("content-length")
            .map(|value| {
                value
                    .parse::<usize>()
                    .map_err(|_| ParseError::InvalidContentLength(value.clone()))
            })
            .transpose()
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> Method {
        self.method
    }

    /// Obtiene el target completo, con query string
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Obtiene el path del request, sin query string
    pub fn path(&self) -> &str {
        match self.target.split_once('?') {
            Some((path, _)) => path,
            None => &self.target,
        }
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene todos los headers (nombres en minúsculas)
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico, sin distinguir mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// Obtiene el body del request
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Codificaciones que el cliente acepta, en el orden del header
    pub fn accepted_encodings(&self) -> &[Encoding] {
        &self.accepted_encodings
    }
}

/// Retorna la longitud de la cabecera (request line + headers + línea
/// vacía), o `None` si la línea vacía todavía no llegó
///
/// Acepta `\r\n\r\n` y, como degradación, `\n\n`.
pub fn head_len(buffer: &[u8]) -> Option<usize> {
    let crlf = find(buffer, b"\r\n\r\n").map(|pos| pos + 4);
    let lf = find(buffer, b"\n\n").map(|pos| pos + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Extrae el `Content-Length` declarado en una cabecera completa
///
/// Lo usa el transporte para saber cuántos bytes de body esperar antes
/// de parsear. Interpreta los headers igual que `Request::parse`: un
/// `Content-Length` repetido se queda con el último valor.
pub fn declared_body_len(head: &[u8]) -> Result<Option<usize>, ParseError> {
    let head = std::str::from_utf8(head)
        .map_err(|_| ParseError::MalformedRequest("request head is not UTF-8".to_string()))?;

    let headers = Request::parse_headers(head.lines().skip(1))?;
    Request::content_length(&headers)
}

/// Decodifica secuencias `%XX` de un segmento de URL
///
/// Las secuencias inválidas (`%zz`, `%` al final) se dejan literales.
/// Retorna bytes: el resultado no tiene por qué ser UTF-8.
///
/// # Ejemplo
/// ```
/// use raw_http_server::http::request::percent_decode;
///
/// assert_eq!(percent_decode("hello%20world"), b"hello world");
/// assert_eq!(percent_decode("a%2Fb"), b"a/b");
/// ```
pub fn percent_decode(s: &str) -> Vec<u8> {
    percent_encoding::percent_decode_str(s).collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.version(), "HTTP/1.1");
        assert!(request.headers().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_parse_all_methods() {
        for method in ["GET", "POST", "PUT", "DELETE", "PATCH"] {
            let raw = format!("{} /x HTTP/1.1\r\n\r\n", method);
            let request = Request::parse(raw.as_bytes()).unwrap();
            assert_eq!(request.method().as_str(), method);
        }
    }

    #[test]
    fn test_target_keeps_query_path_strips_it() {
        let raw = b"GET /echo/abc?debug=1 HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.target(), "/echo/abc?debug=1");
        assert_eq!(request.path(), "/echo/abc");
    }

    #[test]
    fn test_version_defaults_when_missing() {
        let request = Request::parse(b"GET /\r\n\r\n").unwrap();
        assert_eq!(request.version(), "HTTP/1.1");
    }

    #[test]
    fn test_headers_lowercased_last_wins() {
        let raw = b"GET / HTTP/1.1\r\nUser-Agent: first\r\nX-Thing:  padded  \r\nuser-agent: second\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("USER-AGENT"), Some("second"));
        assert_eq!(request.headers().get("x-thing").map(String::as_str), Some("padded"));
    }

    #[test]
    fn test_malformed_header_is_rejected() {
        let raw = b"GET / HTTP/1.1\r\nNoSeparatorHere\r\n\r\n";
        assert!(matches!(
            Request::parse(raw),
            Err(ParseError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_body_with_content_length() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.body(), b"hello");
    }

    #[test]
    fn test_binary_body_is_preserved() {
        let mut raw = b"POST /files/bin HTTP/1.1\r\nContent-Length: 6\r\n\r\n".to_vec();
        raw.extend_from_slice(&[0x00, 0xFF, b'\r', b'\n', 0x80, 0x7F]);
        let request = Request::parse(&raw).unwrap();

        assert_eq!(request.body(), &[0x00, 0xFF, b'\r', b'\n', 0x80, 0x7F]);
    }

    #[test]
    fn test_body_truncated_to_content_length() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcdef";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.body(), b"abc");
    }

    #[test]
    fn test_incomplete_body_is_rejected() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";
        assert!(matches!(
            Request::parse(raw),
            Err(ParseError::IncompleteBody { expected: 10, received: 3 })
        ));
    }

    #[test]
    fn test_invalid_content_length() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: -1\r\n\r\n";
        assert!(matches!(
            Request::parse(raw),
            Err(ParseError::InvalidContentLength(_))
        ));
    }

    #[test]
    fn test_accept_encoding_parsed_in_order() {
        let raw = b"GET / HTTP/1.1\r\nAccept-Encoding: invalid-1, gzip, identity\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(
            request.accepted_encodings(),
            &[Encoding::Gzip, Encoding::Identity]
        );
    }

    #[test]
    fn test_lf_only_degradation() {
        let raw = b"GET /user-agent HTTP/1.1\nUser-Agent: lf\n\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.path(), "/user-agent");
        assert_eq!(request.header("user-agent"), Some("lf"));
    }

    #[test]
    fn test_unsupported_method() {
        let raw = b"BREW /pot HTTP/1.1\r\n\r\n";
        assert!(matches!(
            Request::parse(raw),
            Err(ParseError::UnsupportedMethod(m)) if m == "BREW"
        ));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(Request::parse(b""), Err(ParseError::EmptyRequest)));
        assert!(matches!(Request::parse(b"\r\n\r\n"), Err(ParseError::EmptyRequest)));
    }

    #[test]
    fn test_invalid_request_line() {
        let raw = b"GET\r\n\r\n"; // Falta el target
        assert!(matches!(
            Request::parse(raw),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_non_utf8_head() {
        let raw = b"GET /\xff\xfe HTTP/1.1\r\n\r\n";
        assert!(matches!(
            Request::parse(raw),
            Err(ParseError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_head_len() {
        assert_eq!(head_len(b"GET / HTTP/1.1\r\n\r\nbody"), Some(18));
        assert_eq!(head_len(b"GET / HTTP/1.1\n\nbody"), Some(16));
        assert_eq!(head_len(b"GET / HTTP/1.1\r\nHost: x\r\n"), None);
    }

    #[test]
    fn test_declared_body_len() {
        assert_eq!(
            declared_body_len(b"POST / HTTP/1.1\r\ncontent-length: 42\r\n\r\n"),
            Ok(Some(42))
        );
        assert_eq!(declared_body_len(b"GET / HTTP/1.1\r\n\r\n"), Ok(None));
        assert!(declared_body_len(b"POST / HTTP/1.1\r\nContent-Length: x\r\n\r\n").is_err());
    }

    #[test]
    fn test_declared_body_len_agrees_with_parse_on_duplicates() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 10\r\nContent-Length: 5\r\n\r\nhello";
        let head = &raw[..head_len(raw).unwrap()];

        assert_eq!(declared_body_len(head), Ok(Some(5)));
        assert_eq!(Request::parse(raw).unwrap().body(), b"hello");
    }

    #[test]
    fn test_declared_body_len_rejects_malformed_header() {
        assert!(matches!(
            declared_body_len(b"POST / HTTP/1.1\r\nContent-Length 5\r\n\r\n"),
            Err(ParseError::MalformedHeader(_))
        ));
    }

    #[test]
    fn test_percent_decode() {
        assert_eq!(percent_decode("hello%20world"), b"hello world");
        assert_eq!(percent_decode("%2F%2f"), b"//");
        assert_eq!(percent_decode("100%"), b"100%");
        assert_eq!(percent_decode("%zz%4"), b"%zz%4");
        assert_eq!(percent_decode("%C3%A9"), "é".as_bytes());
    }
}
