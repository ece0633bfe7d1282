//! # Lectura con sondeo
//! src/server/stream.rs
//!
//! Un `read` bloqueante sobre el socket no se entera del apagado. Por eso
//! el socket se configura con un read timeout corto (el intervalo de
//! sondeo) y `PollingReader` reintenta cada vez que vence, revisando entre
//! intentos la señal de apagado y el plazo total del request.

use crate::shutdown::ShutdownSignal;
use std::io::{self, Read};
use std::time::Instant;

/// Adaptador `Read` que respeta la señal de apagado y un deadline
pub struct PollingReader<'a, R> {
    inner: R,
    shutdown: &'a ShutdownSignal,
    deadline: Instant,
}

impl<'a, R: Read> PollingReader<'a, R> {
    pub fn new(inner: R, shutdown: &'a ShutdownSignal, deadline: Instant) -> Self {
        Self {
            inner,
            shutdown,
            deadline,
        }
    }
}

impl<R: Read> Read for PollingReader<'_, R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.shutdown.is_triggered() {
                return Err(io::Error::other("shutdown requested"));
            }
            if Instant::now() >= self.deadline {
                return Err(io::Error::new(io::ErrorKind::TimedOut, "request read deadline exceeded"));
            }

            match self.inner.read(buf) {
                // Venció el timeout del socket: volver a revisar señal y deadline
                Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => continue,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}
