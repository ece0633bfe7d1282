//! # Señal de apagado
//! src/shutdown.rs
//!
//! Token de cancelación compartido por todo el servidor. Se crea una vez,
//! se clona hacia el accept loop y hacia cada conexión, y se consulta en
//! cada punto donde el código puede quedarse esperando (accept, lecturas
//! del socket, antes del dispatch y antes de escribir).
//!
//! Activarla solo escribe un `AtomicBool`, así que es seguro hacerlo desde
//! un handler de señales del sistema operativo.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Granularidad de [`ShutdownSignal::sleep`]
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// Señal de apagado clonable (todas las copias comparten el mismo estado)
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    triggered: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activa la señal. Llamarla más de una vez no tiene efecto adicional.
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    /// Duerme `duration` o hasta que se active la señal
    ///
    /// Retorna `true` si la espera terminó por la señal.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        loop {
            if self.is_triggered() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();
        assert!(!clone.is_triggered());

        signal.trigger();
        assert!(clone.is_triggered());

        // Idempotente
        clone.trigger();
        assert!(signal.is_triggered());
    }

    #[test]
    fn test_sleep_runs_full_duration_without_signal() {
        let signal = ShutdownSignal::new();
        let start = Instant::now();
        assert!(!signal.sleep(Duration::from_millis(60)));
        assert!(start.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_sleep_is_interrupted_by_signal() {
        let signal = ShutdownSignal::new();
        let remote = signal.clone();
        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            remote.trigger();
        });

        let start = Instant::now();
        assert!(signal.sleep(Duration::from_secs(10)));
        assert!(start.elapsed() < Duration::from_secs(5));
        t.join().unwrap();
    }
}
