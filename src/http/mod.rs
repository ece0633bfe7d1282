//! # Módulo HTTP
//!
//! Implementa el protocolo HTTP/1.1 desde cero, sin librerías de alto
//! nivel. Incluye:
//!
//! - Parsing de requests desde un stream (`request`)
//! - Decodificación form-urlencoded de query strings y bodies (`form`)
//! - Mapa de headers case-insensitive (`headers`)
//! - Construcción y serialización de responses (`response`)
//! - Códigos de estado (`status`)
//!
//! Solo se atiende un request por conexión: no hay keep-alive ni
//! chunked transfer encoding.
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/html; charset=utf-8\r\n
//! Server: music_server/0.1.0\r\n
//! Content-Length: 13\r\n
//! \r\n
//! <h1>Hola</h1>
//! ```

pub mod form;
pub mod headers;
pub mod request;
pub mod response;
pub mod status;

// Re-exportamos los tipos principales para usar `http::Request`
// en vez de `http::request::Request`
pub use headers::HeaderMap;
pub use request::{Method, ParseError, Request};
pub use response::Response;
pub use status::StatusCode;
