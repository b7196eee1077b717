//! # Static File Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor HTTP/1.0 de archivos estáticos.

use file_server::config::Config;
use file_server::server::Server;

fn main() {
    println!("=================================");
    println!("  Static File Server (HTTP/1.0)");
    println!("=================================\n");

    let config = Config::new();
    config.print_summary();

    // Valida la configuración y el directorio raíz antes de escuchar
    let server = match Server::bind(config) {
        Ok(server) => server,
        Err(e) => {
            eprintln!("💥 Error fatal: {}", e);
            std::process::exit(1);
        }
    };

    // Bloquea el thread principal
    if let Err(e) = server.run() {
        eprintln!("💥 Error fatal: {}", e);
        std::process::exit(1);
    }
}
