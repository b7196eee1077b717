//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Arranque del servidor y loop de aceptación. Cada conexión aceptada se
//! encola en el [`ThreadPool`]; el loop nunca procesa requests por sí mismo.

use crate::cache::FileCache;
use crate::config::Config;
use crate::error::ServerError;
use crate::metrics::MetricsCollector;
use crate::pool::ThreadPool;
use crate::router::Router;
use crate::server::connection::ConnectionHandler;
use std::fs;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Servidor HTTP/1.0 de archivos estáticos
pub struct Server {
    config: Config,
    listener: TcpListener,
    pool: ThreadPool,
    handler: ConnectionHandler,
}

impl Server {
    /// Prepara todos los componentes y abre el socket de escucha
    ///
    /// Falla sin aceptar conexiones si la configuración es inválida, si el
    /// directorio raíz no existe o no es un directorio, o si el bind falla.
    pub fn bind(config: Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::InvalidConfig)?;
        let root = resolve_root(&config.root_dir)?;

        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        let cache = Arc::new(FileCache::new(config.cache_capacity));
        let metrics = Arc::new(MetricsCollector::with_recent_capacity(
            config.recent_log_capacity,
        ));
        let router = Arc::new(Router::new(root, cache));
        let pool = ThreadPool::new(config.worker_count());

        Ok(Self {
            config,
            listener,
            pool,
            handler: ConnectionHandler::new(router, metrics),
        })
    }

    /// Dirección real de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Métricas compartidas con los workers
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        Arc::clone(self.handler.metrics())
    }

    /// Loop de aceptación
    ///
    /// Solo retorna ante un error de `accept` no transitorio.
    pub fn run(&self) -> Result<(), ServerError> {
        match self.local_addr() {
            Ok(addr) => println!("[+] Servidor escuchando en {}", addr),
            Err(_) => println!("[+] Servidor escuchando en {}", self.config.address()),
        }
        println!(
            "[*] {} workers, cola FIFO sin límite\n",
            self.pool.worker_count()
        );

        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    let handler = self.handler.clone();
                    let client = peer.ip().to_string();

                    self.pool.enqueue(move || {
                        handler.handle(stream, &client);
                    });
                }
                Err(e) if is_transient(&e) => {
                    eprintln!("   ⚠️  Error transitorio al aceptar conexión: {}", e);
                }
                Err(e) => {
                    eprintln!("   ❌ Error al aceptar conexión: {}", e);
                    return Err(ServerError::Accept(e));
                }
            }
        }
    }
}

/// Verifica el directorio raíz y lo convierte en ruta absoluta
fn resolve_root(root: &Path) -> Result<PathBuf, ServerError> {
    let metadata =
        fs::metadata(root).map_err(|_| ServerError::RootNotFound(root.to_path_buf()))?;
    if !metadata.is_dir() {
        return Err(ServerError::RootNotDirectory(root.to_path_buf()));
    }

    Ok(fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf()))
}

/// Errores de `accept` tras los que el loop sigue aceptando
pub fn is_transient(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
    )
}
