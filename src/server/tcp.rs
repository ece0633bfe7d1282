//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Implementación del servidor TCP que maneja múltiples conexiones
//! simultáneas usando threads. Cada conexión se procesa en su propio thread.
//!
//! El listener queda en modo no bloqueante: el loop de accept despierta cada
//! `poll_interval` para revisar la señal de apagado. Al detenerse, el loop
//! suelta el listener (el puerto se libera) y espera un período de gracia a
//! las conexiones que siguen en curso.

use super::connection::{handle_connection, panic_message, ConnectionOptions};
use crate::config::Config;
use crate::router::{RouteInfo, Router};
use crate::shutdown::ShutdownSignal;
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errores del acceptor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("listener error: {0}")]
    Io(#[from] io::Error),
}

/// Servidor HTTP/1.1 concurrente
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
    shutdown: ShutdownSignal,
    running: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
    next_id: AtomicU64,
    options: ConnectionOptions,
    poll_interval: Duration,
    accept_backoff: Duration,
    shutdown_grace: Duration,
}

/// Control remoto del servidor, clonable y seguro entre threads
#[derive(Debug, Clone)]
pub struct ServerHandle {
    shutdown: ShutdownSignal,
    running: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

impl ServerHandle {
    /// Pide al servidor que se detenga
    ///
    /// Idempotente y sin bloqueos: solo cambia dos flags atómicos, así que
    /// se puede llamar desde un handler de señales. El puerto se libera
    /// cuando el loop de accept lo nota, a más tardar un `poll_interval` después.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.shutdown.trigger();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Conexiones que todavía se están atendiendo
    pub fn active_connections(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Decrementa el contador de conexiones activas al salir del thread,
/// incluso si el thread termina por un pánico
struct ActiveGuard(Arc<AtomicUsize>);

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Server {
    /// Abre el listener en `config.address()`
    ///
    /// Con `port = 0` el sistema asigna un puerto efímero; se consulta con
    /// `local_addr()`.
    pub fn bind(config: &Config, router: Router) -> Result<Self, ServerError> {
        let addr = config.address();
        let listener = TcpListener::bind(&addr).map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        Ok(Self {
            listener,
            router: Arc::new(router),
            shutdown: ShutdownSignal::new(),
            running: Arc::new(AtomicBool::new(true)),
            active: Arc::new(AtomicUsize::new(0)),
            next_id: AtomicU64::new(1),
            options: ConnectionOptions::from_config(config),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            accept_backoff: Duration::from_millis(config.accept_backoff_ms),
            shutdown_grace: Duration::from_millis(config.shutdown_grace_ms),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            shutdown: self.shutdown.clone(),
            running: Arc::clone(&self.running),
            active: Arc::clone(&self.active),
        }
    }

    pub fn routes(&self) -> &[RouteInfo] {
        self.router.routes()
    }

    /// Corre el loop de accept hasta que se llame `ServerHandle::stop`
    pub fn run(self) -> Result<(), ServerError> {
        self.listener.set_nonblocking(true)?;
        let addr = self.local_addr()?;
        info!(%addr, "server listening");
        info!("concurrent mode: one thread per connection");

        while self.running.load(Ordering::SeqCst) && !self.shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((stream, peer)) => self.spawn_connection(stream, peer),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    self.shutdown.sleep(self.poll_interval);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    if self.shutdown.is_triggered() {
                        break;
                    }
                    warn!(error = %e, backoff_ms = self.accept_backoff.as_millis() as u64, "accept failed");
                    self.shutdown.sleep(self.accept_backoff);
                }
            }
        }

        let Server {
            listener,
            active,
            shutdown_grace,
            poll_interval,
            ..
        } = self;
        drop(listener);
        info!(%addr, "listener closed");

        Self::drain(&active, shutdown_grace, poll_interval);
        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr) {
        // Los sockets aceptados heredan el modo no bloqueante en algunas plataformas
        if let Err(e) = stream.set_nonblocking(false) {
            warn!(%peer, error = %e, "could not switch connection to blocking mode");
            return;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let router = Arc::clone(&self.router);
        let shutdown = self.shutdown.clone();
        let options = self.options.clone();

        self.active.fetch_add(1, Ordering::SeqCst);
        let guard = ActiveGuard(Arc::clone(&self.active));
        debug!(%peer, id, "new connection");

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", id))
            .spawn(move || {
                let _guard = guard;
                let result = panic::catch_unwind(AssertUnwindSafe(|| {
                    handle_connection(stream, &router, &shutdown, &options)
                }));
                if let Err(payload) = result {
                    error!(%peer, id, panic = %panic_message(payload.as_ref()), "connection thread panicked");
                }
            });

        // Si falla el spawn, el closure (y el guard) se descartan ahí mismo
        if let Err(e) = spawned {
            error!(%peer, error = %e, "could not spawn connection thread");
        }
    }

    /// Espera a que terminen las conexiones en curso, como máximo `grace`
    fn drain(active: &AtomicUsize, grace: Duration, poll_interval: Duration) {
        let deadline = Instant::now() + grace;
        while active.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            thread::sleep(poll_interval.min(Duration::from_millis(25)));
        }

        let remaining = active.load(Ordering::SeqCst);
        if remaining > 0 {
            warn!(remaining, "shutdown grace period elapsed with connections still running");
        } else {
            info!("all connections finished");
        }
    }
}
