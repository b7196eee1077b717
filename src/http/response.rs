//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! Una [`Response`] es solo `(status, content_type, body)`. Los headers de
//! salida los genera la serialización y siempre son los mismos:
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Length: 5\r\n
//! Content-Type: text/html\r\n
//! Connection: close\r\n
//! \r\n
//! hello
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use file_server::http::{Response, StatusCode};
//!
//! let response = Response::text(StatusCode::NotFound, "Not Found\n");
//! let head = response.head_bytes();
//! assert!(head.starts_with(b"HTTP/1.0 404 Not Found\r\n"));
//! ```

use super::status::{reason_phrase, StatusCode};

/// Content-Type de los cuerpos de error y de health
pub const TEXT_PLAIN: &str = "text/plain";

/// Content-Type del documento de métricas
pub const APPLICATION_JSON: &str = "application/json";

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Código numérico (200, 404, etc.)
    status: u16,

    /// Valor del header Content-Type
    content_type: String,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta con un código conocido
    pub fn new(status: StatusCode, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self::with_raw_status(status.as_u16(), content_type, body)
    }

    /// Crea una respuesta con cualquier código numérico
    ///
    /// Los códigos desconocidos se serializan con la reason phrase genérica.
    pub fn with_raw_status(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            body: body.into(),
        }
    }

    /// Respuesta de texto plano
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::{Response, StatusCode};
    ///
    /// let response = Response::text(StatusCode::Forbidden, "Forbidden\n");
    /// assert_eq!(response.content_type(), "text/plain");
    /// ```
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::new(status, TEXT_PLAIN, body)
    }

    /// Respuesta JSON exitosa (200 OK)
    pub fn json(body: String) -> Self {
        Self::new(StatusCode::Ok, APPLICATION_JSON, body)
    }

    /// Genera status line y headers, incluida la línea vacía final
    ///
    /// `Content-Length` siempre coincide con la longitud exacta del body.
    pub fn head_bytes(&self) -> Vec<u8> {
        format!(
            "HTTP/1.0 {} {}\r\nContent-Length: {}\r\nContent-Type: {}\r\nConnection: close\r\n\r\n",
            self.status,
            reason_phrase(self.status),
            self.body.len(),
            self.content_type
        )
        .into_bytes()
    }

    /// Obtiene el código numérico
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Obtiene el Content-Type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
