//! # Manejo de una conexión
//! src/server/connection.rs
//!
//! Cada conexión aceptada produce exactamente una respuesta y se cierra.
//!
//! ```text
//! Parsing ──ok──▶ Dispatching ──ok──▶ Writing ──▶ Closed
//!    │                 │                 ▲
//!    └─ 400 Malformed  └─ 500 Handler ───┘
//! ```
//!
//! - Si el parser falla se responde 400 sin llegar al router.
//! - Si el handler entra en pánico se registra el error y se responde 500.
//! - Los errores de red al escribir (peer cerrado, reset) se ignoran: la
//!   relación con el cliente ya terminó.
//! - El socket se cierra en todas las salidas.

use super::stream::PollingReader;
use crate::config::Config;
use crate::http::response::HEADER_SERVER;
use crate::http::{ParseError, Request, Response, StatusCode};
use crate::router::Router;
use crate::shutdown::ShutdownSignal;
use std::any::Any;
use std::io::{BufReader, Write};
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

pub const MALFORMED_REQUEST_BODY: &str = "<h1>400 Bad Request</h1><p>Malformed request</p>";
pub const INTERNAL_ERROR_BODY: &str = "<h1>500 Internal Server Error</h1><p>Internal server error</p>";

/// Tamaño de cada escritura; entre bloques se revisa la señal de apagado
const WRITE_CHUNK: usize = 16 * 1024;

/// Parámetros de I/O por conexión
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Plazo total para recibir el request completo
    pub read_timeout: Duration,

    /// Timeout de cada `read` del socket (cada cuánto se revisa el apagado)
    pub poll_interval: Duration,

    /// Timeout de cada `write` del socket
    pub write_timeout: Duration,
}

impl ConnectionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            read_timeout: Duration::from_millis(config.read_timeout_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            write_timeout: Duration::from_millis(config.read_timeout_ms),
        }
    }
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Cómo terminó una conexión
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// La respuesta se escribió completa
    Responded(StatusCode),

    /// Había respuesta pero el peer ya no la pudo recibir
    WriteFailed(StatusCode),

    /// El peer se fue mientras se leía el request
    PeerGone,

    /// Se activó el apagado antes de terminar
    Cancelled,
}

/// Atiende una conexión completa: parsea, despacha, escribe y cierra
pub fn handle_connection(
    stream: TcpStream,
    router: &Router,
    shutdown: &ShutdownSignal,
    options: &ConnectionOptions,
) -> ConnectionOutcome {
    let start = Instant::now();
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let outcome = serve(&stream, &peer, router, shutdown, options);

    // Cierre explícito; el drop de `stream` libera el descriptor
    let _ = stream.shutdown(Shutdown::Both);

    debug!(
        peer = %peer,
        outcome = ?outcome,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "connection closed"
    );
    outcome
}

fn serve(
    stream: &TcpStream,
    peer: &str,
    router: &Router,
    shutdown: &ShutdownSignal,
    options: &ConnectionOptions,
) -> ConnectionOutcome {
    if let Err(e) = stream
        .set_read_timeout(Some(options.poll_interval))
        .and_then(|_| stream.set_write_timeout(Some(options.write_timeout)))
    {
        debug!(peer = %peer, error = %e, "could not configure socket timeouts");
        return ConnectionOutcome::PeerGone;
    }

    // Parsing
    let deadline = Instant::now() + options.read_timeout;
    let mut reader = BufReader::new(PollingReader::new(stream, shutdown, deadline));
    let response = match Request::read_from(&mut reader, shutdown) {
        Ok(request) => {
            // Dispatching
            if shutdown.is_triggered() {
                return ConnectionOutcome::Cancelled;
            }
            let started = Instant::now();
            let response = dispatch_guarded(router, &request, peer);
            info!(
                peer = %peer,
                method = %request.method(),
                path = request.path(),
                status = response.status().as_u16(),
                elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                "request handled"
            );
            response
        }
        Err(ParseError::Cancelled) => {
            debug!(peer = %peer, "request read cancelled by shutdown");
            return ConnectionOutcome::Cancelled;
        }
        Err(ParseError::Io(kind)) => {
            debug!(peer = %peer, kind = ?kind, "peer went away while sending the request");
            return ConnectionOutcome::PeerGone;
        }
        Err(e) => {
            warn!(peer = %peer, error = %e, "malformed request");
            Response::bad_request(MALFORMED_REQUEST_BODY)
        }
    };

    // Writing
    write_response(stream, peer, response, shutdown)
}

/// Ejecuta el router atrapando cualquier pánico del handler
fn dispatch_guarded(router: &Router, request: &Request, peer: &str) -> Response {
    match panic::catch_unwind(AssertUnwindSafe(|| router.dispatch(request))) {
        Ok(response) => response,
        Err(payload) => {
            error!(
                peer = %peer,
                method = %request.method(),
                path = request.path(),
                panic = %panic_message(payload.as_ref()),
                "handler failed"
            );
            Response::internal_server_error(INTERNAL_ERROR_BODY)
        }
    }
}

/// Escribe la respuesta en bloques; los errores de red no se propagan
fn write_response(
    mut stream: &TcpStream,
    peer: &str,
    mut response: Response,
    shutdown: &ShutdownSignal,
) -> ConnectionOutcome {
    let status = response.status();
    response.add_header("Connection", "close");
    debug_assert!(response.headers().contains(HEADER_SERVER));

    let bytes = response.to_bytes();
    for chunk in bytes.chunks(WRITE_CHUNK) {
        if shutdown.is_triggered() {
            return ConnectionOutcome::Cancelled;
        }
        if let Err(e) = stream.write_all(chunk) {
            debug!(peer = %peer, error = %e, "peer went away while writing the response");
            return ConnectionOutcome::WriteFailed(status);
        }
    }
    if let Err(e) = stream.flush() {
        debug!(peer = %peer, error = %e, "flush failed");
        return ConnectionOutcome::WriteFailed(status);
    }

    ConnectionOutcome::Responded(status)
}

/// Extrae el mensaje de un pánico (`&str` o `String`)
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
