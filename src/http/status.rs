//! # Códigos de Estado HTTP
//! src/http/status.rs
//!
//! Códigos de estado HTTP/1.0 que produce el servidor de archivos.
//! Según el RFC 1945 se agrupan en:
//!
//! - **2xx**: Éxito (200 OK)
//! - **4xx**: Error del cliente (400, 403, 404, 405)
//! - **5xx**: Error del servidor (500)

/// Reason phrase usada para códigos que el servidor no reconoce
pub const UNKNOWN_REASON: &str = "Unknown";

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// 200 OK - Archivo servido
    Ok = 200,

    /// 400 Bad Request - Request imposible de parsear
    BadRequest = 400,

    /// 403 Forbidden - Intento de salir del directorio raíz
    Forbidden = 403,

    /// 404 Not Found - Archivo inexistente o es un directorio
    NotFound = 404,

    /// 405 Method Not Allowed - Cualquier método distinto de GET
    MethodNotAllowed = 405,

    /// 500 Internal Server Error - El archivo existe pero no se pudo leer
    InternalServerError = 500,
}

impl StatusCode {
    /// Todos los códigos conocidos, en orden numérico.
    ///
    /// El agregador de métricas mantiene un contador por cada uno.
    pub const ALL: [StatusCode; 6] = [
        StatusCode::Ok,
        StatusCode::BadRequest,
        StatusCode::Forbidden,
        StatusCode::NotFound,
        StatusCode::MethodNotAllowed,
        StatusCode::InternalServerError,
    ];

    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::Forbidden.as_u16(), 403);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Busca el código conocido que corresponde a un valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::from_u16(404), Some(StatusCode::NotFound));
    /// assert_eq!(StatusCode::from_u16(418), None);
    /// ```
    pub fn from_u16(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|status| status.as_u16() == code)
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }
}

/// Reason phrase para un código numérico arbitrario
///
/// Los códigos que no conocemos reciben [`UNKNOWN_REASON`].
///
/// # Ejemplo
/// ```
/// use file_server::http::status::reason_phrase;
/// assert_eq!(reason_phrase(405), "Method Not Allowed");
/// assert_eq!(reason_phrase(299), "Unknown");
/// ```
pub fn reason_phrase(code: u16) -> &'static str {
    StatusCode::from_u16(code)
        .map(|status| status.reason_phrase())
        .unwrap_or(UNKNOWN_REASON)
}

impl From<StatusCode> for u16 {
    fn from(status: StatusCode) -> u16 {
        status.as_u16()
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
