//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Ciclo de vida de una conexión: leer el request completo, parsear,
//! despachar, escribir la respuesta y cerrar. Exactamente un intercambio
//! request/response por socket.
//!
//! La lectura acumula bloques de `READ_CHUNK` bytes hasta ver la línea
//! vacía; si hay `Content-Length`, sigue leyendo hasta tener el body
//! completo. Nunca se despacha un body parcial. Sin `Content-Length`, el
//! body es lo que ya llegó detrás de la cabecera.
//!
//! El deadline de lectura cubre la conexión entera, no cada `read()`: un
//! cliente que manda de a un byte igual recibe 408 al vencer.

use crate::config::Config;
use crate::error::ParseError;
use crate::handlers;
use crate::http::request::{declared_body_len, head_len};
use crate::http::{Request, Response, StatusCode};
use crate::router::Router;
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::{Duration, Instant};

/// Tamaño de cada lectura del socket
pub const READ_CHUNK: usize = 1024;

/// Stream al que se le puede acotar cuánto espera la próxima lectura
pub trait TimedRead: Read {
    fn limit_next_read(&mut self, timeout: Duration) -> io::Result<()>;
}

impl TimedRead for TcpStream {
    fn limit_next_read(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_read_timeout(Some(timeout))
    }
}

/// Límites que se aplican a cada conexión
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

impl Limits {
    pub fn from_config(config: &Config) -> Self {
        Self {
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
            max_header_bytes: config.max_header_bytes,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Resultado de leer un request del socket
#[derive(Debug, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Bytes del request, con el body completo si se declaró
    Complete(Vec<u8>),

    /// El cliente cerró sin mandar nada
    Closed,

    /// Headers o body declarado sobre el límite
    TooLarge,

    /// Venció el deadline de lectura
    TimedOut,

    /// La cabecera no permite saber cuánto leer
    Invalid(ParseError),
}

/// Lee un request completo desde el stream antes de `deadline`
///
/// Si el cliente cierra antes de completar, se entrega lo que llegó y el
/// parser decide (un body incompleto termina en `IncompleteBody`).
pub fn read_request<R: TimedRead>(
    stream: &mut R,
    limits: &Limits,
    deadline: Instant,
) -> io::Result<ReadOutcome> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];
    let mut expected_total: Option<usize> = None;

    loop {
        if let Some(total) = expected_total {
            if buffer.len() >= total {
                buffer.truncate(total);
                return Ok(ReadOutcome::Complete(buffer));
            }
        }

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(ReadOutcome::TimedOut);
        }
        stream.limit_next_read(remaining)?;

        let n = match stream.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Ok(ReadOutcome::TimedOut);
            }
            Err(e) => return Err(e),
        };

        if n == 0 {
            if buffer.is_empty() {
                return Ok(ReadOutcome::Closed);
            }
            return Ok(ReadOutcome::Complete(buffer));
        }

        buffer.extend_from_slice(&chunk[..n]);

        if expected_total.is_some() {
            continue;
        }

        match head_len(&buffer) {
            Some(head_end) if head_end > limits.max_header_bytes => {
                return Ok(ReadOutcome::TooLarge);
            }
            Some(head_end) => match declared_body_len(&buffer[..head_end]) {
                Ok(Some(length)) if length > limits.max_body_bytes => {
                    return Ok(ReadOutcome::TooLarge);
                }
                Ok(Some(length)) => expected_total = Some(head_end + length),
                // Sin longitud declarada el body es lo que vino con la cabecera
                Ok(None) if buffer.len() - head_end > limits.max_body_bytes => {
                    return Ok(ReadOutcome::TooLarge);
                }
                Ok(None) => return Ok(ReadOutcome::Complete(buffer)),
                Err(e) => return Ok(ReadOutcome::Invalid(e)),
            },
            None if buffer.len() > limits.max_header_bytes => {
                return Ok(ReadOutcome::TooLarge);
            }
            None => {}
        }
    }
}

/// Atiende un intercambio completo sobre cualquier stream
///
/// El deadline de lectura corre desde `start`. Retorna el status
/// enviado, o `None` si el cliente cerró sin mandar nada y no hubo
/// respuesta.
pub fn serve<S: TimedRead + Write>(
    stream: &mut S,
    router: &Router,
    limits: &Limits,
    start: Instant,
) -> io::Result<Option<StatusCode>> {
    let deadline = start + limits.read_timeout;
    let response = match read_request(stream, limits, deadline)? {
        ReadOutcome::Closed => {
            tracing::debug!("connection closed by peer before sending data");
            return Ok(None);
        }
        ReadOutcome::TimedOut => {
            tracing::warn!("read deadline expired");
            handlers::status_response(StatusCode::RequestTimeout)
        }
        ReadOutcome::TooLarge => {
            tracing::warn!("request exceeds configured limits");
            handlers::status_response(StatusCode::PayloadTooLarge)
        }
        ReadOutcome::Invalid(e) => {
            tracing::warn!(error = %e, "invalid request framing");
            handlers::parse_error_response(&e)
        }
        ReadOutcome::Complete(bytes) => handle_bytes(&bytes, router),
    };

    stream.write_all(&response.to_bytes())?;
    stream.flush()?;

    Ok(Some(response.status()))
}

fn handle_bytes(bytes: &[u8], router: &Router) -> Response {
    match Request::parse(bytes) {
        Ok(request) => {
            tracing::info!(
                method = request.method().as_str(),
                target = request.target(),
                "request"
            );
            router.dispatch(&request)
        }
        Err(e) => {
            tracing::warn!(error = %e, "parse error");
            handlers::parse_error_response(&e)
        }
    }
}

/// Atiende una conexión TCP y la cierra
pub fn handle_connection(mut stream: TcpStream, router: &Router, limits: &Limits) -> io::Result<()> {
    let start = Instant::now();

    stream.set_write_timeout(Some(limits.write_timeout))?;

    let result = serve(&mut stream, router, limits, start);

    // El servidor siempre cierra, sin keep-alive
    let _ = stream.shutdown(Shutdown::Both);

    if let Some(status) = result? {
        tracing::info!(
            status = status.as_u16(),
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "response sent"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::TempDir;
    use crate::storage::FileStore;
    use std::io::Cursor;
    use std::thread;

    /// Stream en memoria: lee de `input` en bloques de `chunk` y guarda lo escrito
    struct MockStream {
        input: Cursor<Vec<u8>>,
        chunk: usize,
        output: Vec<u8>,
        fail_with: Option<io::ErrorKind>,
        delay: Duration,
        timeouts: Vec<Duration>,
    }

    impl MockStream {
        fn new(input: &[u8]) -> Self {
            Self {
                input: Cursor::new(input.to_vec()),
                chunk: 7,
                output: Vec::new(),
                fail_with: None,
                delay: Duration::ZERO,
                timeouts: Vec::new(),
            }
        }
    }

    impl TimedRead for MockStream {
        fn limit_next_read(&mut self, timeout: Duration) -> io::Result<()> {
            self.timeouts.push(timeout);
            Ok(())
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            thread::sleep(self.delay);
            let n = buf.len().min(self.chunk);
            let read = self.input.read(&mut buf[..n])?;
            if read == 0 {
                if let Some(kind) = self.fail_with {
                    return Err(io::Error::new(kind, "mock"));
                }
            }
            Ok(read)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(10)
    }

    fn small_limits() -> Limits {
        Limits {
            max_header_bytes: 64,
            max_body_bytes: 16,
            ..Limits::default()
        }
    }

    #[test]
    fn test_read_request_accumulates_small_chunks() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world";
        let mut stream = MockStream::new(raw);

        let outcome = read_request(&mut stream, &Limits::default(), later()).unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(raw.to_vec()));
    }

    #[test]
    fn test_read_request_stops_at_declared_length() {
        let mut stream =
            MockStream::new(b"POST /files/a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcEXTRA BYTES");
        stream.fail_with = Some(io::ErrorKind::WouldBlock);

        let outcome = read_request(&mut stream, &Limits::default(), later()).unwrap();
        assert_eq!(
            outcome,
            ReadOutcome::Complete(b"POST /files/a HTTP/1.1\r\nContent-Length: 3\r\n\r\nabc".to_vec())
        );
    }

    #[test]
    fn test_read_request_keeps_body_without_content_length() {
        let raw = b"POST /files/x.txt HTTP/1.1\r\n\r\nhello";
        let mut stream = MockStream::new(raw);
        stream.chunk = READ_CHUNK;
        stream.fail_with = Some(io::ErrorKind::WouldBlock);

        let outcome = read_request(&mut stream, &Limits::default(), later()).unwrap();
        assert_eq!(outcome, ReadOutcome::Complete(raw.to_vec()));
    }

    #[test]
    fn test_read_request_deadline_covers_whole_request() {
        // Cada byte llega rápido, pero el total supera el deadline
        let mut stream = MockStream::new(&[b'a'; 60]);
        stream.chunk = 1;
        stream.delay = Duration::from_millis(5);

        let deadline = Instant::now() + Duration::from_millis(50);
        let outcome = read_request(&mut stream, &Limits::default(), deadline).unwrap();

        assert_eq!(outcome, ReadOutcome::TimedOut);
        assert!(stream.timeouts.len() < 60);
        // Cada lectura espera a lo sumo lo que queda del deadline
        assert!(stream.timeouts.windows(2).all(|w| w[1] <= w[0]));
        assert!(stream.timeouts.iter().all(|t| *t <= Duration::from_millis(50)));
    }

    #[test]
    fn test_read_request_closed_without_data() {
        let mut stream = MockStream::new(b"");
        assert_eq!(
            read_request(&mut stream, &Limits::default(), later()).unwrap(),
            ReadOutcome::Closed
        );
    }

    #[test]
    fn test_read_request_timeout_waiting_for_body() {
        let mut stream = MockStream::new(b"POST /files/a HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc");
        stream.fail_with = Some(io::ErrorKind::WouldBlock);

        assert_eq!(
            read_request(&mut stream, &Limits::default(), later()).unwrap(),
            ReadOutcome::TimedOut
        );
    }

    #[test]
    fn test_read_request_limits() {
        let mut big_body = MockStream::new(b"POST /files/a HTTP/1.1\r\nContent-Length: 17\r\n\r\n");
        assert_eq!(
            read_request(&mut big_body, &small_limits(), later()).unwrap(),
            ReadOutcome::TooLarge
        );

        let long_header = format!("GET / HTTP/1.1\r\nX-Long: {}\r\n\r\n", "a".repeat(100));
        let mut big_head = MockStream::new(long_header.as_bytes());
        assert_eq!(
            read_request(&mut big_head, &small_limits(), later()).unwrap(),
            ReadOutcome::TooLarge
        );
    }

    #[test]
    fn test_read_request_invalid_content_length() {
        let mut stream = MockStream::new(b"POST /files/a HTTP/1.1\r\nContent-Length: nope\r\n\r\n");
        assert!(matches!(
            read_request(&mut stream, &Limits::default(), later()).unwrap(),
            ReadOutcome::Invalid(ParseError::InvalidContentLength(_))
        ));
    }

    #[test]
    fn test_serve_echo() {
        let dir = TempDir::new("conn_echo");
        let router = Router::with_default_routes(FileStore::new(dir.path()));
        let mut stream = MockStream::new(b"GET /echo/hello%20world HTTP/1.1\r\n\r\n");

        let status = serve(&mut stream, &router, &Limits::default(), Instant::now()).unwrap();
        assert_eq!(status, Some(StatusCode::Ok));

        let response = Response::parse(&stream.output).unwrap();
        assert_eq!(response.body(), b"hello world");
        assert_eq!(response.header("Content-Length"), Some("11"));
    }

    #[test]
    fn test_serve_truncated_body_is_bad_request() {
        let dir = TempDir::new("conn_truncated");
        let router = Router::with_default_routes(FileStore::new(dir.path()));
        let mut stream =
            MockStream::new(b"POST /files/partial HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc");

        let status = serve(&mut stream, &router, &Limits::default(), Instant::now()).unwrap();
        assert_eq!(status, Some(StatusCode::BadRequest));
        // El body parcial nunca llegó al handler
        assert!(!dir.path().join("partial").exists());
    }

    #[test]
    fn test_serve_trickling_client_gets_408() {
        let dir = TempDir::new("conn_trickle");
        let router = Router::with_default_routes(FileStore::new(dir.path()));
        let mut stream = MockStream::new(b"GET /echo/this-request-arrives-one-byte-at-a-time HTTP/1.1\r\n\r\n");
        stream.chunk = 1;
        stream.delay = Duration::from_millis(5);
        let limits = Limits {
            read_timeout: Duration::from_millis(50),
            ..Limits::default()
        };

        let start = Instant::now();
        let status = serve(&mut stream, &router, &limits, start).unwrap();

        assert_eq!(status, Some(StatusCode::RequestTimeout));
        assert!(start.elapsed() < Duration::from_secs(1));
        let response = Response::parse(&stream.output).unwrap();
        assert_eq!(response.body(), b"408 Request Timeout");
    }

    #[test]
    fn test_serve_post_without_content_length_stores_body() {
        let dir = TempDir::new("conn_no_length");
        let router = Router::with_default_routes(FileStore::new(dir.path()));
        let mut stream = MockStream::new(b"POST /files/x.txt HTTP/1.1\r\n\r\nhello");
        stream.chunk = READ_CHUNK;

        let status = serve(&mut stream, &router, &Limits::default(), Instant::now()).unwrap();

        assert_eq!(status, Some(StatusCode::Created));
        assert_eq!(std::fs::read(dir.path().join("x.txt")).unwrap(), b"hello");
    }

    #[test]
    fn test_serve_duplicate_content_length_last_wins() {
        let dir = TempDir::new("conn_dup_length");
        let router = Router::with_default_routes(FileStore::new(dir.path()));
        let mut stream = MockStream::new(
            b"POST /files/dup.txt HTTP/1.1\r\nContent-Length: 10\r\nContent-Length: 5\r\n\r\nhello",
        );
        stream.fail_with = Some(io::ErrorKind::WouldBlock);

        let status = serve(&mut stream, &router, &Limits::default(), Instant::now()).unwrap();

        assert_eq!(status, Some(StatusCode::Created));
        assert_eq!(std::fs::read(dir.path().join("dup.txt")).unwrap(), b"hello");
    }

    #[test]
    fn test_serve_unsupported_method() {
        let dir = TempDir::new("conn_method");
        let router = Router::with_default_routes(FileStore::new(dir.path()));
        let mut stream = MockStream::new(b"BREW /pot HTTP/1.1\r\n\r\n");

        let status = serve(&mut stream, &router, &Limits::default(), Instant::now()).unwrap();
        assert_eq!(status, Some(StatusCode::MethodNotAllowed));
    }

    #[test]
    fn test_serve_closed_writes_nothing() {
        let dir = TempDir::new("conn_closed");
        let router = Router::with_default_routes(FileStore::new(dir.path()));
        let mut stream = MockStream::new(b"");

        assert_eq!(serve(&mut stream, &router, &Limits::default(), Instant::now()).unwrap(), None);
        assert!(stream.output.is_empty());
    }
}
