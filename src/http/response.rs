//! # Construcción de Respuestas HTTP
//!
//! API para construir respuestas HTTP/1.1 y convertirlas a bytes listos
//! para escribir en el socket.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 302 Found\r\n
//! Content-Type: text/html; charset=utf-8\r\n
//! Server: music_server/0.1.0\r\n
//! Location: /status\r\n
//! Content-Length: 71\r\n
//! \r\n
//! <h1>302 Found</h1>...
//! ```
//!
//! `Content-Length` se calcula al serializar a partir del body ya
//! codificado en UTF-8 (bytes, no caracteres) e ignora cualquier valor
//! puesto antes por el handler.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use music_server::http::Response;
//!
//! let response = Response::json(r#"{"message": "Hola"}"#)
//!     .with_header("X-Custom", "1");
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.1 200 OK\r\n"));
//! ```

use super::{HeaderMap, StatusCode};

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";
pub const HEADER_LOCATION: &str = "Location";
pub const HEADER_SERVER: &str = "Server";

pub const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";
pub const CONTENT_TYPE_TEXT: &str = "text/plain; charset=utf-8";

/// Valor del header `Server`
pub const SERVER_NAME: &str = concat!("music_server/", env!("CARGO_PKG_VERSION"));

/// Representa una respuesta HTTP completa
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,

    /// Orden de inserción = orden en el wire
    headers: HeaderMap,

    body: String,
}

impl Response {
    /// Crea una respuesta con `Content-Type` y `Server` ya puestos
    pub fn new(status: StatusCode, body: impl Into<String>, content_type: &str) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(HEADER_CONTENT_TYPE, content_type);
        headers.insert(HEADER_SERVER, SERVER_NAME);

        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    // === Factories ===

    /// 200 OK con HTML
    pub fn ok(html: impl Into<String>) -> Self {
        Self::new(StatusCode::Ok, html, CONTENT_TYPE_HTML)
    }

    /// 200 OK con un content type arbitrario
    pub fn ok_with_type(body: impl Into<String>, content_type: &str) -> Self {
        Self::new(StatusCode::Ok, body, content_type)
    }

    /// 200 OK con JSON
    pub fn json(json: impl Into<String>) -> Self {
        Self::new(StatusCode::Ok, json, CONTENT_TYPE_JSON)
    }

    /// 200 OK con texto plano
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(StatusCode::Ok, text, CONTENT_TYPE_TEXT)
    }

    pub fn created(html: impl Into<String>) -> Self {
        Self::new(StatusCode::Created, html, CONTENT_TYPE_HTML)
    }

    /// 302 Found con un body HTML por defecto que enlaza a `location`
    ///
    /// # Ejemplo
    /// ```
    /// use music_server::http::{Response, StatusCode};
    ///
    /// let response = Response::redirect("/status");
    /// assert_eq!(response.status(), StatusCode::Found);
    /// assert_eq!(response.header("location"), Some("/status"));
    /// ```
    pub fn redirect(location: &str) -> Self {
        let safe = escape_html(location);
        let body = format!(
            "<h1>302 Found</h1><p>Redirecting to <a href='{0}'>{0}</a></p>",
            safe
        );
        Self::redirect_with_body(location, body)
    }

    pub fn redirect_with_body(location: &str, body: impl Into<String>) -> Self {
        Self::new(StatusCode::Found, body, CONTENT_TYPE_HTML).with_header(HEADER_LOCATION, location)
    }

    pub fn bad_request(html: impl Into<String>) -> Self {
        Self::new(StatusCode::BadRequest, html, CONTENT_TYPE_HTML)
    }

    pub fn not_found(html: impl Into<String>) -> Self {
        Self::new(StatusCode::NotFound, html, CONTENT_TYPE_HTML)
    }

    pub fn payload_too_large(html: impl Into<String>) -> Self {
        Self::new(StatusCode::PayloadTooLarge, html, CONTENT_TYPE_HTML)
    }

    pub fn internal_server_error(html: impl Into<String>) -> Self {
        Self::new(StatusCode::InternalServerError, html, CONTENT_TYPE_HTML)
    }

    /// Agrega o reemplaza un header (versión builder)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Agrega o reemplaza un header en una respuesta existente
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name, value);
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers en orden de inserción: `Nombre: Valor\r\n`
    /// - `Content-Length` con el largo en bytes del body (reemplazado en su
    ///   posición si ya existía, agregado al final si no)
    /// - Línea vacía y body
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.body.as_bytes();
        let content_length = body.len().to_string();

        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status.as_u16(), self.status.reason_phrase());
        let mut wrote_length = false;
        for (name, value) in self.headers.iter() {
            let value = if name.eq_ignore_ascii_case(HEADER_CONTENT_LENGTH) {
                wrote_length = true;
                content_length.as_str()
            } else {
                value
            };
            head.push_str(&format!("{}: {}\r\n", name, value));
        }
        if !wrote_length {
            head.push_str(&format!("{}: {}\r\n", HEADER_CONTENT_LENGTH, content_length));
        }
        head.push_str("\r\n");

        let mut result = Vec::with_capacity(head.len() + body.len());
        result.extend_from_slice(head.as_bytes());
        result.extend_from_slice(body);
        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn reason_phrase(&self) -> &'static str {
        self.status.reason_phrase()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Escapa `& < > " '` para insertar texto en HTML
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wire(response: &Response) -> String {
        String::from_utf8(response.to_bytes()).unwrap()
    }

    #[test]
    fn test_ok_defaults_to_html() {
        let response = Response::ok("<p>hi</p>");
        assert_eq!(response.status(), StatusCode::Ok);
        assert_eq!(response.header("Content-Type"), Some(CONTENT_TYPE_HTML));
        assert_eq!(response.header("Server"), Some(SERVER_NAME));
    }

    #[test]
    fn test_factory_content_types() {
        assert_eq!(Response::json("{}").header("content-type"), Some(CONTENT_TYPE_JSON));
        assert_eq!(Response::text("x").header("content-type"), Some(CONTENT_TYPE_TEXT));
        assert_eq!(
            Response::ok_with_type("a,b", "text/csv").header("content-type"),
            Some("text/csv")
        );
        assert_eq!(Response::created("ok").status(), StatusCode::Created);
        assert_eq!(Response::bad_request("x").status(), StatusCode::BadRequest);
        assert_eq!(Response::not_found("x").status(), StatusCode::NotFound);
        assert_eq!(Response::payload_too_large("x").status(), StatusCode::PayloadTooLarge);
        assert_eq!(Response::internal_server_error("x").status(), StatusCode::InternalServerError);
    }

    #[test]
    fn test_redirect_default_body() {
        let response = Response::redirect("/status?x='1'");
        assert_eq!(response.status(), StatusCode::Found);
        assert_eq!(response.header("Location"), Some("/status?x='1'"));
        assert!(response.body().contains("Redirecting to <a href='/status?x=&#39;1&#39;'>"));
    }

    #[test]
    fn test_redirect_custom_body() {
        let response = Response::redirect_with_body("/", "go home");
        assert_eq!(response.header("Location"), Some("/"));
        assert_eq!(response.body(), "go home");
    }

    #[test]
    fn test_to_bytes_layout() {
        let response = Response::text("Test").with_header("X-Custom", "value");
        let text = wire(&response);

        assert_eq!(
            text,
            format!(
                "HTTP/1.1 200 OK\r\nContent-Type: {}\r\nServer: {}\r\nX-Custom: value\r\nContent-Length: 4\r\n\r\nTest",
                CONTENT_TYPE_TEXT, SERVER_NAME
            )
        );
    }

    #[test]
    fn test_content_length_counts_bytes() {
        let response = Response::ok("canción ♪");
        let text = wire(&response);
        assert!(text.contains(&format!("Content-Length: {}\r\n", "canción ♪".len())));
        assert_ne!("canción ♪".len(), "canción ♪".chars().count());
    }

    #[test]
    fn test_caller_content_length_is_overridden_in_place() {
        let response = Response::text("abc")
            .with_header("content-length", "999")
            .with_header("X-After", "1");
        let text = wire(&response);

        assert!(text.contains("content-length: 3\r\nX-After: 1\r\n"));
        assert!(!text.contains("999"));
        assert_eq!(text.matches("ength:").count(), 1);
    }

    #[test]
    fn test_empty_body() {
        let text = wire(&Response::ok(""));
        assert!(text.ends_with("Content-Length: 0\r\n\r\n"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
