//! # Parsing de Requests HTTP/1.0
//! src/http/request.rs
//!
//! Parser mínimo de HTTP/1.0. Es una función pura: recibe los bytes leídos
//! del socket y produce un [`Request`] o un [`ParseError`].
//!
//! ## Formato de un Request HTTP/1.0
//!
//! ```text
//! GET /index.html HTTP/1.0\r\n
//! Host: localhost:8080\r\n
//! User-Agent: curl/7.68.0\r\n
//! \r\n
//! ```
//!
//! El parser no valida el método ni la versión contra ninguna lista: de la
//! semántica se encarga el router. Tampoco lee el body.

use std::collections::HashMap;

/// Terminador del bloque de headers
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Representa un request HTTP/1.0 parseado
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Método tal como vino en la request line (ej: "GET")
    method: String,

    /// Target del request sin modificar (ej: "/index.html")
    path: String,

    /// Versión HTTP (ej: "HTTP/1.0")
    version: String,

    /// Headers con el nombre en minúsculas y el valor sin espacios
    headers: HashMap<String, String>,
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No aparece `\r\n\r\n` en el buffer
    MissingTerminator,

    /// El bloque de headers no es UTF-8 válido
    InvalidEncoding,

    /// La request line no tiene exactamente método, path y versión
    InvalidRequestLine,
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::MissingTerminator => write!(f, "Missing header terminator"),
            ParseError::InvalidEncoding => write!(f, "Header block is not valid UTF-8"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Busca la posición del terminador de headers dentro del buffer
pub fn find_header_end(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(HEADER_TERMINATOR.len())
        .position(|window| window == HEADER_TERMINATOR)
}

impl Request {
    /// Parsea un request HTTP/1.0 desde bytes
    ///
    /// # Retorna
    ///
    /// * `Ok(Request)` - Request parseado exitosamente
    /// * `Err(ParseError)` - Falta el terminador o la request line es inválida
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use file_server::http::Request;
    ///
    /// let raw = b"GET /index.html HTTP/1.0\r\nHost: example\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.path(), "/index.html");
    /// assert_eq!(request.header("host"), Some("example"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        let header_end = find_header_end(buffer).ok_or(ParseError::MissingTerminator)?;

        let head = std::str::from_utf8(&buffer[..header_end])
            .map_err(|_| ParseError::InvalidEncoding)?;

        // Separamos por '\n' y quitamos el '\r' final si existe, así
        // toleramos líneas que terminan solo en '\n'
        let mut lines = head.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));

        let request_line = lines.next().ok_or(ParseError::InvalidRequestLine)?;
        let (method, path, version) = Self::parse_request_line(request_line)?;

        let headers = Self::parse_headers(lines);

        Ok(Request {
            method,
            path,
            version,
            headers,
        })
    }

    /// Parsea la request line (primera línea del request)
    ///
    /// Formato: `GET /path HTTP/1.0`
    fn parse_request_line(line: &str) -> Result<(String, String, String), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();

        // Debe tener exactamente 3 partes: METHOD PATH VERSION
        match parts.as_slice() {
            [method, path, version] => Ok((
                method.to_string(),
                path.to_string(),
                version.to_string(),
            )),
            _ => Err(ParseError::InvalidRequestLine),
        }
    }

    /// Parsea los headers HTTP
    ///
    /// Cada header tiene formato "Name: Value". Las líneas sin ':' se
    /// ignoran. Si un nombre se repite gana la última línea procesada.
    fn parse_headers<'a>(lines: impl Iterator<Item = &'a str>) -> HashMap<String, String> {
        let mut headers = HashMap::new();

        for line in lines {
            // La línea vacía marca el fin de los headers
            if line.is_empty() {
                break;
            }

            if let Some((name, value)) = line.split_once(':') {
                headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }

        headers
    }

    // === Métodos públicos para acceder a los campos ===

    /// Obtiene el método HTTP del request
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Obtiene el path del request, sin normalizar
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Obtiene la versión HTTP
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Obtiene todos los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico, sin importar mayúsculas
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// Reconstruye la request line (`METHOD PATH VERSION`)
    pub fn request_line(&self) -> String {
        format!("{} {} {}", self.method, self.path, self.version)
    }
}
