//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado que emite el servidor. Los códigos que no están en
//! la tabla se conservan tal cual (`StatusCode::Other`) y se serializan
//! con reason phrase vacía: `HTTP/1.1 299 \r\n`.

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok,

    /// 201 Created - Archivo escrito en el directorio servido
    Created,

    /// 400 Bad Request - Request malformado o path inválido
    BadRequest,

    /// 404 Not Found - Ruta o archivo no encontrado
    NotFound,

    /// 405 Method Not Allowed - Método fuera del conjunto soportado
    MethodNotAllowed,

    /// 408 Request Timeout - El cliente no completó el request a tiempo
    RequestTimeout,

    /// 413 Payload Too Large - Headers o body sobre el límite configurado
    PayloadTooLarge,

    /// 500 Internal Server Error - Error interno del servidor
    InternalServerError,

    /// 503 Service Unavailable - Cola de conexiones llena
    ServiceUnavailable,

    /// Cualquier otro código, sin reason phrase
    Other(u16),
}

impl StatusCode {
    /// Construye el código a partir de su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http_server::http::StatusCode;
    /// assert_eq!(StatusCode::from_u16(201), StatusCode::Created);
    /// assert_eq!(StatusCode::from_u16(299), StatusCode::Other(299));
    /// ```
    pub fn from_u16(code: u16) -> Self {
        match code {
            200 => StatusCode::Ok,
            201 => StatusCode::Created,
            400 => StatusCode::BadRequest,
            404 => StatusCode::NotFound,
            405 => StatusCode::MethodNotAllowed,
            408 => StatusCode::RequestTimeout,
            413 => StatusCode::PayloadTooLarge,
            500 => StatusCode::InternalServerError,
            503 => StatusCode::ServiceUnavailable,
            other => StatusCode::Other(other),
        }
    }

    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use raw_http_server::http::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::MethodNotAllowed => 405,
            StatusCode::RequestTimeout => 408,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::InternalServerError => 500,
            StatusCode::ServiceUnavailable => 503,
            StatusCode::Other(code) => *code,
        }
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    ///
    /// Vacío para códigos desconocidos.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::ServiceUnavailable => "Service Unavailable",
            StatusCode::Other(_) => "",
        }
    }

    /// Verifica si el código indica éxito (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.as_u16())
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato de status line: "200 OK", o "299 " si no hay reason phrase
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
