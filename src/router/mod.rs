//! # Router de Archivos Estáticos
//! src/router/mod.rs
//!
//! Mapea un request a un archivo bajo el directorio raíz.
//!
//! ## Política
//!
//! ```text
//! Request → método ≠ GET?        → 405
//!         → "/" → "/index.html"
//!         → normalización léxica → ".." restante → 403
//!         → raíz + path          → no existe / es directorio → 404
//!         → caché / disco        → error de lectura → 500
//!         → 200 + Content-Type por extensión
//! ```
//!
//! La verificación de `..` es puramente léxica y ocurre antes de tocar el
//! sistema de archivos. El router es seguro para usar desde varios workers a
//! la vez: solo comparte la caché, que tiene su propio lock.

use crate::cache::FileCache;
use crate::http::{Request, Response, StatusCode};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Archivo servido cuando se pide `/`
pub const INDEX_FILE: &str = "/index.html";

/// Content-Type para extensiones desconocidas
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Router que resuelve paths contra el directorio raíz
pub struct Router {
    /// Directorio raíz de los archivos servidos
    root: PathBuf,

    /// Contenido de archivos ya leídos, por ruta absoluta
    cache: Arc<FileCache>,
}

impl Router {
    /// Crea un router sobre `root` que comparte la caché indicada
    pub fn new(root: impl Into<PathBuf>, cache: Arc<FileCache>) -> Self {
        Self {
            root: root.into(),
            cache,
        }
    }

    /// Obtiene el directorio raíz
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Obtiene la caché compartida
    pub fn cache(&self) -> &Arc<FileCache> {
        &self.cache
    }

    /// Resuelve un request y genera la respuesta
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::cache::FileCache;
    /// use file_server::http::Request;
    /// use file_server::router::Router;
    /// use std::sync::Arc;
    ///
    /// let router = Router::new("/srv/www", Arc::new(FileCache::new(10)));
    /// let request = Request::parse(b"DELETE / HTTP/1.0\r\n\r\n").unwrap();
    /// assert_eq!(router.handle(&request).status(), 405);
    /// ```
    pub fn handle(&self, request: &Request) -> Response {
        if request.method() != "GET" {
            return Response::text(StatusCode::MethodNotAllowed, "Method Not Allowed\n");
        }

        let target = strip_query(request.path());
        let target = match target {
            "" | "/" => INDEX_FILE,
            other => other,
        };

        match normalize_path(target) {
            Some(relative) => self.serve_file(&relative),
            None => Response::text(StatusCode::Forbidden, "Forbidden\n"),
        }
    }

    /// Sirve un path ya normalizado, relativo a la raíz
    fn serve_file(&self, relative: &Path) -> Response {
        let full = self.root.join(relative);

        match fs::metadata(&full) {
            Ok(meta) if !meta.is_dir() => {}
            _ => return Response::text(StatusCode::NotFound, "Not Found\n"),
        }

        match self.load(&full) {
            Ok(data) => Response::new(StatusCode::Ok, &content_type_for(&full), data.to_vec()),
            Err(e) => {
                eprintln!("   ❌ Error leyendo {}: {}", full.display(), e);
                Response::text(StatusCode::InternalServerError, "Internal Server Error\n")
            }
        }
    }

    /// Obtiene el contenido del archivo desde la caché o desde disco
    ///
    /// Dos workers que piden el mismo archivo sin cachear pueden leerlo los
    /// dos; el último `put` gana.
    fn load(&self, full: &Path) -> io::Result<Arc<[u8]>> {
        let key = full.to_string_lossy().into_owned();

        if let Some(data) = self.cache.get(key.as_str()) {
            return Ok(data);
        }

        let data: Arc<[u8]> = fs::read(full)?.into();
        self.cache.put(key, Arc::clone(&data));
        Ok(data)
    }
}

/// Quita `?query` y `#fragment` del target
fn strip_query(target: &str) -> &str {
    let end = target.find(['?', '#']).unwrap_or(target.len());
    &target[..end]
}

/// Normaliza léxicamente un path y lo vuelve relativo a la raíz
///
/// Elimina `.` y segmentos vacíos, y resuelve `dir/..`. Retorna `None` si
/// después de normalizar queda algún `..`, es decir, si el path intenta salir
/// de la raíz.
///
/// # Ejemplo
/// ```
/// use file_server::router::normalize_path;
/// use std::path::PathBuf;
///
/// assert_eq!(normalize_path("/a/./b/../c.txt"), Some(PathBuf::from("a/c.txt")));
/// assert_eq!(normalize_path("/../etc/passwd"), None);
/// assert_eq!(normalize_path("/a/../../b"), None);
/// ```
pub fn normalize_path(target: &str) -> Option<PathBuf> {
    let mut segments: Vec<&str> = Vec::new();

    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                // Un ".." que sale de la raíz no se puede compensar después
                segments.pop()?;
            }
            name => segments.push(name),
        }
    }

    let relative: PathBuf = segments.iter().collect();

    // Un segmento como "C:" o con separadores propios de la plataforma
    // no debe convertirse en un path absoluto
    let only_normal = relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));

    only_normal.then_some(relative)
}

/// Content-Type según la extensión del archivo
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
}
