//! # Music Server - Entry Point
//! src/main.rs
//!
//! Punto de entrada del servidor HTTP/1.1: lee la configuración, arma la
//! aplicación y corre el acceptor hasta recibir SIGINT/SIGTERM.

use anyhow::{Context, Result};
use music_server::app::{self, SongRegistry, ViewRenderer};
use music_server::config::Config;
use music_server::logging;
use music_server::server::{Server, ServerHandle};
use std::sync::Arc;
use tracing::info;

fn main() {
    if let Err(e) = run() {
        eprintln!("💥 Error fatal: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let config = Config::new();
    config
        .validate()
        .map_err(anyhow::Error::msg)
        .context("invalid configuration")?;
    logging::init(&config.log_level, &config.log_format)?;

    let songs = Arc::new(SongRegistry::seeded());
    let views = Arc::new(ViewRenderer::new(&config.views_dir).context("could not load views")?);
    info!(dir = %views.dir().display(), songs = songs.count(), "application ready");

    let router = app::build_router(songs, views).context("could not register routes")?;
    let server = Server::bind(&config, router)?;
    let addr = server.local_addr()?;

    config.print_summary();
    println!("🎵 Music Server running on http://{}", addr);
    println!("📊 Available endpoints:");
    for route in server.routes() {
        if route.description.is_empty() {
            println!("   {:<6} {}", route.method, route.path);
        } else {
            println!("   {:<6} {} - {}", route.method, route.path, route.description);
        }
    }
    println!("Press Ctrl+C to stop the server\n");

    install_signal_handler(server.handle())?;
    server.run()?;

    info!("server stopped");
    Ok(())
}

/// Thread que espera SIGINT/SIGTERM y detiene el servidor
#[cfg(unix)]
fn install_signal_handler(handle: ServerHandle) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM]).context("could not install signal handler")?;
    std::thread::Builder::new()
        .name("signals".to_string())
        .spawn(move || {
            if let Some(signal) = signals.forever().next() {
                info!(signal, "shutdown requested");
                handle.stop();
            }
        })
        .context("could not spawn signal thread")?;
    Ok(())
}

#[cfg(not(unix))]
fn install_signal_handler(_handle: ServerHandle) -> Result<()> {
    tracing::warn!("signal handling is only available on unix; stop the process externally");
    Ok(())
}
