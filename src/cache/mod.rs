//! # Caché de Archivos
//! src/cache/mod.rs
//!
//! Memoiza el contenido de los archivos servidos en una caché LRU acotada.
//!
//! La caché nunca detecta cambios en disco: un archivo cacheado se sigue
//! sirviendo igual hasta que otro lo desaloje.

pub mod lru;

use std::sync::Arc;

pub use lru::LruCache;

/// Caché usada por el router: ruta absoluta → bytes del archivo
pub type FileCache = LruCache<String, Arc<[u8]>>;
