//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! Este módulo implementa el servidor TCP que:
//! 1. Escucha en un puerto (`tcp`)
//! 2. Acepta conexiones entrantes, una por thread (`tcp`)
//! 3. Lee y parsea el request respetando el apagado (`stream`)
//! 4. Despacha al router y escribe la respuesta (`connection`)

pub mod connection;
pub mod stream;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{handle_connection, ConnectionOptions, ConnectionOutcome};
pub use tcp::{Server, ServerError, ServerHandle};
