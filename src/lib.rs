//! # Music Server
//! src/lib.rs
//!
//! Servidor HTTP/1.1 minimalista implementado desde cero sobre TCP, con un
//! catálogo de canciones en memoria como aplicación de ejemplo.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `http`: Parsing de requests y construcción de responses HTTP/1.1
//! - `router`: Enrutamiento exacto (método, path) a handlers
//! - `server`: Acceptor TCP y manejo de cada conexión
//! - `shutdown`: Señal de apagado compartida por todas las capas
//! - `config`: Argumentos CLI y variables de entorno
//! - `logging`: Inicialización de `tracing`
//! - `app`: Registro de canciones, plantillas y handlers
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use music_server::config::Config;
//! use music_server::http::{Request, Response};
//! use music_server::router::Router;
//! use music_server::server::Server;
//!
//! let mut router = Router::new();
//! router.get("/hello", |_req: &Request| Response::text("Hello"), "Saludo").unwrap();
//!
//! let server = Server::bind(&Config::default(), router).unwrap();
//! let handle = server.handle();
//! // handle.stop() desde otro thread termina `run`
//! server.run().unwrap();
//! # drop(handle);
//! ```

pub mod app;
pub mod config;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
pub mod shutdown;
