//! # Módulo HTTP
//!
//! Implementación mínima del protocolo HTTP/1.0, sin librerías de alto nivel:
//!
//! - Parsing de requests HTTP/1.0 (request line + headers)
//! - Serialización de responses con `Content-Length` exacto
//! - Códigos de estado y sus reason phrases
//!
//! ## Especificación HTTP/1.0
//!
//! El protocolo HTTP/1.0 (RFC 1945) es más simple que HTTP/1.1:
//! - No requiere el header `Host`
//! - No tiene chunked transfer encoding
//! - No mantiene conexiones persistentes: el servidor siempre responde
//!   `Connection: close` y cierra el socket
//!
//! ### Formato de Request
//!
//! ```text
//! GET /index.html HTTP/1.0\r\n
//! Header-Name: Header-Value\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Length: 5\r\n
//! Content-Type: text/html\r\n
//! Connection: close\r\n
//! \r\n
//! hello
//! ```

pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
