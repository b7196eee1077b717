//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! - `tcp`: arranque, bind y loop de aceptación
//! - `connection`: ciclo de vida de una conexión (leer, responder, registrar, cerrar)

pub mod connection;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{ConnectionHandler, Outcome};
pub use tcp::Server;
