//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor HTTP con soporte para argumentos CLI y
//! variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./music_server --port 8080 \
//!   --views-dir ./views \
//!   --read-timeout-ms 30000 \
//!   --log-format json
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 HTTP_HOST=0.0.0.0 VIEWS_DIR=/srv/views ./music_server
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Formatos de log soportados por `--log-format`
pub const LOG_FORMATS: [&str; 2] = ["console", "json"];

/// Configuración del servidor HTTP/1.1
#[derive(Debug, Clone, Parser)]
#[command(name = "music_server")]
#[command(about = "Servidor HTTP/1.1 minimalista con un catálogo de canciones")]
#[command(version)]
pub struct Config {
    /// Puerto en el que escucha el servidor (0 = puerto efímero)
    #[arg(short, long, default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Directorio con las plantillas HTML (debe contener index.html)
    #[arg(long = "views-dir", default_value = "./views", env = "VIEWS_DIR")]
    pub views_dir: PathBuf,

    // === Timeouts ===
    /// Plazo máximo para recibir un request completo, en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "30000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Cada cuánto se revisa la señal de apagado mientras se espera I/O
    #[arg(long = "poll-interval-ms", default_value = "50", env = "POLL_INTERVAL_MS")]
    pub poll_interval_ms: u64,

    /// Pausa después de un error de accept
    #[arg(long = "accept-backoff-ms", default_value = "1000", env = "ACCEPT_BACKOFF_MS")]
    pub accept_backoff_ms: u64,

    /// Tiempo que se espera a las conexiones en curso al apagar
    #[arg(long = "shutdown-grace-ms", default_value = "5000", env = "SHUTDOWN_GRACE_MS")]
    pub shutdown_grace_ms: u64,

    // === Logging ===
    /// Nivel de log (`RUST_LOG` tiene prioridad)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Formato de log: console | json
    #[arg(long = "log-format", default_value = "console", env = "LOG_FORMAT")]
    pub log_format: String,
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
    /// use music_server::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("Host must not be empty".to_string());
        }

        // Validar timeouts
        if self.read_timeout_ms == 0 {
            return Err("Read timeout must be > 0".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("Poll interval must be > 0".to_string());
        }
        if self.poll_interval_ms > self.read_timeout_ms {
            return Err(format!(
                "Poll interval ({} ms) must not exceed the read timeout ({} ms)",
                self.poll_interval_ms, self.read_timeout_ms
            ));
        }

        // Validar logging
        if !LOG_FORMATS.contains(&self.log_format.as_str()) {
            return Err(format!(
                "Unknown log format '{}' (expected one of: {})",
                self.log_format,
                LOG_FORMATS.join(", ")
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err("Log level must not be empty".to_string());
        }

        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║              Music Server HTTP/1.1 Configuration             ║");
        println!("╚══════════════════════════════════════════════════════════════╝");
        println!();
        println!("🌐 Network:");
        println!("   Address:      {}", self.address());
        println!("   Views dir:    {}", self.views_dir.display());
        println!();
        println!("⏱  Timeouts:");
        println!("   Read:         {} ms", self.read_timeout_ms);
        println!("   Poll:         {} ms", self.poll_interval_ms);
        println!("   Accept retry: {} ms", self.accept_backoff_ms);
        println!("   Shutdown:     {} ms", self.shutdown_grace_ms);
        println!();
        println!("📝 Logging:      {} ({})", self.log_level, self.log_format);
        println!();
        println!("═══════════════════════════════════════════════════════════════");
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto (igual a los defaults del CLI)
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            views_dir: PathBuf::from("./views"),
            read_timeout_ms: 30_000,
            poll_interval_ms: 50,
            accept_backoff_ms: 1_000,
            shutdown_grace_ms: 5_000,
            log_level: "info".to_string(),
            log_format: "console".to_string(),
        }
    }
}
