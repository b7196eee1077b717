//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor de archivos con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./file_server --port 8080 --workers 8 --root ./static --cache-capacity 200
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 ROOT_DIR=/srv/www WORKERS=4 ./file_server
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Configuración del servidor HTTP/1.0
#[derive(Debug, Clone, Parser)]
#[command(name = "file_server")]
#[command(about = "Servidor HTTP/1.0 concurrente de archivos estáticos")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto efímero)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Número de workers (por defecto, el número de CPUs lógicas)
    #[arg(short, long, env = "WORKERS")]
    pub workers: Option<usize>,

    /// Directorio raíz desde el que se sirven los archivos
    #[arg(short, long = "root", default_value = "./static", env = "ROOT_DIR")]
    pub root_dir: PathBuf,

    // === Caché y métricas ===

    /// Máximo de archivos en la caché LRU
    #[arg(long = "cache-capacity", default_value = "100", env = "CACHE_CAPACITY")]
    pub cache_capacity: usize,

    /// Máximo de entradas en el log de requests recientes
    #[arg(long = "recent-capacity", default_value = "100", env = "RECENT_LOG_CAPACITY")]
    pub recent_log_capacity: usize,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use file_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Número efectivo de workers
    ///
    /// Sin valor explícito se usa el número de CPUs del host. Siempre es al
    /// menos 1.
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos. La existencia del directorio
    /// raíz se verifica al arrancar el servidor.
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }
        if self.cache_capacity == 0 {
            return Err("Cache capacity must be >= 1".to_string());
        }
        if self.recent_log_capacity == 0 {
            return Err("Recent log capacity must be >= 1".to_string());
        }
        if self.root_dir.as_os_str().is_empty() {
            return Err("Root directory must not be empty".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║            Static File Server Configuration                 ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Root dir:     {}", self.root_dir.display());
        println!();
        println!("👷 Worker Pool:");
        match self.workers {
            Some(n) => println!("   Workers:      {}", n.max(1)),
            None => println!("   Workers:      {} (CPU hint)", self.worker_count()),
        }
        println!("   Queue:        unbounded (FIFO)");
        println!();
        println!("🗄️  Cache & Metrics:");
        println!("   LRU entries:  {}", self.cache_capacity);
        println!("   Recent log:   {} entries", self.recent_log_capacity);
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            workers: None,
            root_dir: PathBuf::from("./static"),
            cache_capacity: 100,
            recent_log_capacity: 100,
        }
    }
}
