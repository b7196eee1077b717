//! # Static File Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 concurrente de archivos estáticos, implementado sobre
//! `std::net` y threads del sistema operativo.
//!
//! ## Arquitectura
//!
//! - `config`: Argumentos CLI y variables de entorno
//! - `error`: Errores fatales de arranque y aceptación
//! - `http`: Parsing de requests y serialización de responses HTTP/1.0
//! - `cache`: Caché LRU de contenido de archivos
//! - `pool`: Pool fijo de workers con cola FIFO
//! - `router`: Resolución de paths a archivos bajo el directorio raíz
//! - `metrics`: Contadores, conexiones activas y log de requests recientes
//! - `server`: Loop de aceptación y manejo de conexiones
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use file_server::config::Config;
//! use file_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(config).expect("Error al iniciar servidor");
//! server.run().expect("Error en el loop de aceptación");
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod metrics;
pub mod pool;
pub mod router;
pub mod server;
