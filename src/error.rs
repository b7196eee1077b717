//! # Errores del Servidor
//! src/error.rs
//!
//! Errores fatales: impiden arrancar el servidor o terminan el loop de
//! aceptación. Los errores de un request individual nunca llegan acá; se
//! convierten en una respuesta HTTP dentro del handler.

use std::io;
use std::path::PathBuf;

/// Errores fatales del servidor
#[derive(Debug)]
pub enum ServerError {
    /// Algún valor de configuración es inválido
    InvalidConfig(String),

    /// El directorio raíz no existe
    RootNotFound(PathBuf),

    /// El directorio raíz existe pero no es un directorio
    RootNotDirectory(PathBuf),

    /// No se pudo hacer bind/listen en la dirección pedida
    Bind { address: String, source: io::Error },

    /// `accept` falló con un error no transitorio
    Accept(io::Error),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            ServerError::RootNotFound(path) => {
                write!(f, "Root directory does not exist: {}", path.display())
            }
            ServerError::RootNotDirectory(path) => {
                write!(f, "Root path is not a directory: {}", path.display())
            }
            ServerError::Bind { address, source } => {
                write!(f, "Cannot listen on {}: {}", address, source)
            }
            ServerError::Accept(e) => write!(f, "Accept failed: {}", e),
        }
    }
}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Bind { source, .. } => Some(source),
            ServerError::Accept(e) => Some(e),
            _ => None,
        }
    }
}
