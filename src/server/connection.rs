//! # Manejo de una Conexión
//! src/server/connection.rs
//!
//! Orquesta una conexión de principio a fin, siempre en el mismo orden:
//!
//! ```text
//! OPEN → READING_HEADERS → { 400 | /admin/metrics | /admin/health | router }
//!      → RESPONDING → LOGGED → CLOSED
//! ```
//!
//! - La conexión cuenta como activa mientras vive el [`ConnectionGuard`].
//! - Un error de lectura aborta la conexión sin responder. Un EOF sin datos
//!   no es un error: el buffer vacío no parsea y se responde 400.
//! - `/admin/metrics` se responde pero no se cuenta ni se registra en el log.
//! - El stream se cierra al salir de `handle`, por cualquier camino.
//!
//! [`ConnectionGuard`]: crate::metrics::ConnectionGuard

use crate::http::request::find_header_end;
use crate::http::{Request, Response, StatusCode};
use crate::metrics::collector::TIMESTAMP_FORMAT;
use crate::metrics::{MetricsCollector, RecentLogEntry};
use crate::router::Router;
use std::io::{self, Read, Write};
use std::sync::Arc;

/// Límite de bytes acumulados mientras se buscan los headers
pub const MAX_HEADER_BYTES: usize = 64 * 1024;

/// Endpoint administrativo de métricas (no se cuenta)
pub const METRICS_PATH: &str = "/admin/metrics";

/// Endpoint administrativo de salud
pub const HEALTH_PATH: &str = "/admin/health";

/// Path registrado cuando el request no se pudo parsear
pub const UNPARSED_PATH: &str = "-";

/// Tamaño de cada lectura del socket
const READ_CHUNK: usize = 8192;

/// Resultado de atender una conexión
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Error de lectura: se cerró sin responder
    Aborted(io::ErrorKind),

    /// Se envió una respuesta
    Responded {
        path: String,
        status: u16,
        bytes: u64,
        /// `false` solo para el endpoint de métricas
        counted: bool,
    },
}

/// Handler de conexiones, compartido por todos los workers
#[derive(Clone)]
pub struct ConnectionHandler {
    router: Arc<Router>,
    metrics: Arc<MetricsCollector>,
}

impl ConnectionHandler {
    pub fn new(router: Arc<Router>, metrics: Arc<MetricsCollector>) -> Self {
        Self { router, metrics }
    }

    /// Métricas que actualiza este handler
    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Atiende una conexión completa y la cierra
    ///
    /// `client` es la dirección del peer tal como aparece en el log.
    pub fn handle<S: Read + Write>(&self, mut stream: S, client: &str) -> Outcome {
        // OPEN: se decrementa al salir, por cualquier camino
        let _active = self.metrics.open_connection();

        // READING_HEADERS
        let buffer = match read_head(&mut stream) {
            Ok(buffer) => buffer,
            Err(e) => {
                eprintln!("   ❌ Error leyendo de {}: {}", client, e);
                return Outcome::Aborted(e.kind());
            }
        };

        let (path, response) = match Request::parse(&buffer) {
            Ok(request) => {
                let response = self.dispatch(&request);
                (request.path().to_string(), response)
            }
            Err(e) => {
                eprintln!("   ❌ Request inválido de {}: {}", client, e);
                (
                    UNPARSED_PATH.to_string(),
                    Response::text(StatusCode::BadRequest, "Bad Request\n"),
                )
            }
        };

        // RESPONDING
        let bytes = write_response(&mut stream, &response, client);
        let status = response.status();

        // LOGGED
        let counted = path != METRICS_PATH;
        if counted {
            let entry = RecentLogEntry {
                time: chrono::Local::now().format(TIMESTAMP_FORMAT).to_string(),
                client: client.to_string(),
                path: path.clone(),
                status,
                bytes,
            };
            println!(
                "[{}] {} \"{}\" {} {}",
                entry.time, entry.client, entry.path, entry.status, entry.bytes
            );
            self.metrics.record_request(entry);
        }

        // CLOSED: el stream se libera al retornar
        Outcome::Responded {
            path,
            status,
            bytes,
            counted,
        }
    }

    /// Elige quién genera la respuesta para un request válido
    fn dispatch(&self, request: &Request) -> Response {
        match request.path() {
            METRICS_PATH => Response::json(self.metrics.to_json()),
            HEALTH_PATH => Response::text(StatusCode::Ok, "OK\n"),
            _ => self.router.handle(request),
        }
    }
}

/// Lee hasta encontrar `\r\n\r\n`, llegar a [`MAX_HEADER_BYTES`] o EOF
fn read_head<R: Read>(stream: &mut R) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = match stream.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if n == 0 {
            break;
        }

        // El terminador puede quedar partido entre dos lecturas
        let search_from = buffer.len().saturating_sub(3);
        buffer.extend_from_slice(&chunk[..n]);

        if find_header_end(&buffer[search_from..]).is_some() || buffer.len() >= MAX_HEADER_BYTES {
            break;
        }
    }

    Ok(buffer)
}

/// Escribe headers y body por separado
///
/// Retorna los bytes de la respuesta completa. Un error de escritura se
/// reporta pero no impide registrar el request.
fn write_response<W: Write>(stream: &mut W, response: &Response, client: &str) -> u64 {
    let head = response.head_bytes();
    let total = (head.len() + response.body().len()) as u64;

    if let Err(e) = send(stream, &head, response.body()) {
        eprintln!("   ❌ Error escribiendo a {}: {}", client, e);
    }

    total
}

fn send<W: Write>(stream: &mut W, head: &[u8], body: &[u8]) -> io::Result<()> {
    stream.write_all(head)?;
    if !body.is_empty() {
        stream.write_all(body)?;
    }
    stream.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FileCache;
    use std::fs;
    use tempfile::TempDir;

    /// Stream en memoria que entrega la entrada en trozos de `chunk` bytes
    struct MockStream {
        input: Vec<u8>,
        position: usize,
        chunk: usize,
        output: Vec<u8>,
        read_error: Option<io::ErrorKind>,
        write_error: bool,
    }

    impl MockStream {
        fn new(input: &[u8]) -> Self {
            Self {
                input: input.to_vec(),
                position: 0,
                chunk: usize::MAX,
                output: Vec::new(),
                read_error: None,
                write_error: false,
            }
        }

        fn chunked(input: &[u8], chunk: usize) -> Self {
            Self {
                chunk,
                ..Self::new(input)
            }
        }

        fn output_text(&self) -> String {
            String::from_utf8_lossy(&self.output).to_string()
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if let Some(kind) = self.read_error {
                return Err(io::Error::new(kind, "mock read error"));
            }
            let remaining = &self.input[self.position..];
            let n = remaining.len().min(buf.len()).min(self.chunk);
            buf[..n].copy_from_slice(&remaining[..n]);
            self.position += n;
            Ok(n)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.write_error {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "mock write error"));
            }
            self.output.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn setup() -> (TempDir, ConnectionHandler) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "hello").unwrap();

        let router = Arc::new(Router::new(dir.path(), Arc::new(FileCache::new(8))));
        let metrics = Arc::new(MetricsCollector::new());
        (dir, ConnectionHandler::new(router, metrics))
    }

    #[test]
    fn test_get_index() {
        let (_dir, handler) = setup();
        let mut stream = MockStream::new(b"GET / HTTP/1.0\r\nHost: x\r\n\r\n");

        let outcome = handler.handle(&mut stream, "127.0.0.1");
        let text = stream.output_text();

        assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
        assert!(text.contains("Content-Length: 5\r\n"));
        assert!(text.contains("Content-Type: text/html\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.ends_with("\r\n\r\nhello"));

        assert_eq!(
            outcome,
            Outcome::Responded {
                path: "/".to_string(),
                status: 200,
                bytes: stream.output.len() as u64,
                counted: true,
            }
        );

        let metrics = handler.metrics();
        assert_eq!(metrics.total_requests(), 1);
        assert_eq!(metrics.bytes_sent(), stream.output.len() as u64);
        assert_eq!(metrics.status_count(StatusCode::Ok), 1);
        assert_eq!(metrics.active_connections(), 0);
        assert_eq!(metrics.peak_connections(), 1);

        let recent = metrics.recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].client, "127.0.0.1");
        assert_eq!(recent[0].path, "/");
    }

    #[test]
    fn test_headers_split_across_reads() {
        let (_dir, handler) = setup();
        let mut stream = MockStream::chunked(b"GET /index.html HTTP/1.0\r\nHost: x\r\n\r\n", 3);

        handler.handle(&mut stream, "c");
        assert!(stream.output_text().ends_with("hello"));
    }

    #[test]
    fn test_parse_failure_is_400() {
        let (_dir, handler) = setup();
        let mut stream = MockStream::new(b"\x00\x01garbage\r\n\r\n");

        let outcome = handler.handle(&mut stream, "c");
        let text = stream.output_text();

        assert!(text.starts_with("HTTP/1.0 400 Bad Request\r\n"));
        assert!(text.ends_with("Bad Request\n"));
        assert!(matches!(outcome, Outcome::Responded { status: 400, .. }));
        assert_eq!(handler.metrics().status_count(StatusCode::BadRequest), 1);
        assert_eq!(handler.metrics().recent()[0].path, UNPARSED_PATH);
    }

    #[test]
    fn test_missing_terminator_before_eof_is_400() {
        let (_dir, handler) = setup();
        let mut stream = MockStream::new(b"GET / HTTP/1.0\r\n");

        handler.handle(&mut stream, "c");
        assert!(stream.output_text().starts_with("HTTP/1.0 400 Bad Request\r\n"));
    }

    #[test]
    fn test_oversized_header_stops_at_cap() {
        let (_dir, handler) = setup();
        let mut input = b"GET / HTTP/1.0\r\nX-Big: ".to_vec();
        input.extend(std::iter::repeat(b'a').take(MAX_HEADER_BYTES * 2));
        let mut stream = MockStream::new(&input);

        handler.handle(&mut stream, "c");

        assert!(stream.position < input.len());
        assert!(stream.position >= MAX_HEADER_BYTES);
        assert!(stream.output_text().starts_with("HTTP/1.0 400 Bad Request\r\n"));
    }

    #[test]
    fn test_health_endpoint_is_counted() {
        let (_dir, handler) = setup();
        let mut stream = MockStream::new(b"GET /admin/health HTTP/1.0\r\n\r\n");

        handler.handle(&mut stream, "c");

        assert!(stream.output_text().ends_with("\r\n\r\nOK\n"));
        assert_eq!(handler.metrics().total_requests(), 1);
    }

    #[test]
    fn test_metrics_endpoint_is_not_counted() {
        let (_dir, handler) = setup();
        handler.handle(&mut MockStream::new(b"GET / HTTP/1.0\r\n\r\n"), "c");

        let before = handler.metrics().snapshot();
        for _ in 0..3 {
            let mut stream = MockStream::new(b"GET /admin/metrics HTTP/1.0\r\n\r\n");
            let outcome = handler.handle(&mut stream, "c");

            assert!(matches!(outcome, Outcome::Responded { counted: false, status: 200, .. }));
            assert!(stream.output_text().contains("Content-Type: application/json\r\n"));
        }
        let after = handler.metrics().snapshot();

        assert_eq!(after.total_requests, before.total_requests);
        assert_eq!(after.bytes_sent, before.bytes_sent);
        assert_eq!(after.status_counts, before.status_counts);
        assert_eq!(after.recent, before.recent);
    }

    #[test]
    fn test_metrics_document_reports_current_connection() {
        let (_dir, handler) = setup();
        let mut stream = MockStream::new(b"GET /admin/metrics HTTP/1.0\r\n\r\n");
        handler.handle(&mut stream, "c");

        let text = stream.output_text();
        let body = &text[text.find("\r\n\r\n").unwrap() + 4..];
        let json: serde_json::Value = serde_json::from_str(body).unwrap();

        assert_eq!(json["active_connections"], 1);
        assert_eq!(json["total_requests"], 0);
        assert!(json["recent"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_read_error_aborts_without_response() {
        let (_dir, handler) = setup();
        let mut stream = MockStream::new(b"GET / HTTP/1.0\r\n\r\n");
        stream.read_error = Some(io::ErrorKind::ConnectionReset);

        let outcome = handler.handle(&mut stream, "c");

        assert_eq!(outcome, Outcome::Aborted(io::ErrorKind::ConnectionReset));
        assert!(stream.output.is_empty());
        assert_eq!(handler.metrics().total_requests(), 0);
        assert_eq!(handler.metrics().active_connections(), 0);
    }

    #[test]
    fn test_empty_connection_is_400() {
        let (_dir, handler) = setup();
        let mut stream = MockStream::new(b"");

        let outcome = handler.handle(&mut stream, "c");

        assert!(matches!(outcome, Outcome::Responded { status: 400, counted: true, .. }));
        assert!(stream.output_text().starts_with("HTTP/1.0 400 Bad Request\r\n"));
        assert!(stream.output_text().ends_with("Bad Request\n"));

        let metrics = handler.metrics();
        assert_eq!(metrics.total_requests(), 1);
        assert_eq!(metrics.status_count(StatusCode::BadRequest), 1);
        assert_eq!(metrics.recent()[0].path, UNPARSED_PATH);
        assert_eq!(metrics.active_connections(), 0);
    }

    #[test]
    fn test_write_error_still_logged() {
        let (_dir, handler) = setup();
        let mut stream = MockStream::new(b"GET / HTTP/1.0\r\n\r\n");
        stream.write_error = true;

        let outcome = handler.handle(&mut stream, "c");

        assert!(matches!(outcome, Outcome::Responded { status: 200, .. }));
        assert_eq!(handler.metrics().total_requests(), 1);
        assert_eq!(handler.metrics().active_connections(), 0);
    }

    #[test]
    fn test_router_statuses_propagate() {
        let (_dir, handler) = setup();

        let cases: [(&[u8], u16); 3] = [
            (b"POST /index.html HTTP/1.0\r\n\r\n", 405),
            (b"GET /../../etc/passwd HTTP/1.0\r\n\r\n", 403),
            (b"GET /missing.txt HTTP/1.0\r\n\r\n", 404),
        ];

        for (raw, expected) in cases {
            let mut stream = MockStream::new(raw);
            let outcome = handler.handle(&mut stream, "c");
            assert!(
                matches!(outcome, Outcome::Responded { status, .. } if status == expected),
                "expected {}",
                expected
            );
        }

        let metrics = handler.metrics();
        assert_eq!(metrics.status_count(StatusCode::MethodNotAllowed), 1);
        assert_eq!(metrics.status_count(StatusCode::Forbidden), 1);
        assert_eq!(metrics.status_count(StatusCode::NotFound), 1);
    }
}
