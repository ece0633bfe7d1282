//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing-subscriber` una sola vez al arrancar. `RUST_LOG`
//! tiene prioridad sobre `--log-level`.

use std::panic;
use tracing_subscriber::EnvFilter;

/// Instala el subscriber global
///
/// `format` es `console` o `json` (ya validado por `Config::validate`).
/// Retorna error si ya había un subscriber instalado.
pub fn init(level: &str, format: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true);

    match format {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {}", e))?;

    install_panic_hook();
    Ok(())
}

/// Manda los pánicos a `tracing` en vez de stderr crudo
fn install_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let thread = std::thread::current();
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".to_string());

        tracing::error!(
            thread = thread.name().unwrap_or("unnamed"),
            location = %location,
            "panic: {}",
            message
        );
    }));
}
