//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Parser HTTP escrito a mano que lee directamente de un stream de bytes.
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /action?from=form HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! Content-Type: application/x-www-form-urlencoded\r\n
//! Content-Length: 33\r\n
//! \r\n
//! title=Flowers&artist=Miley+Cyrus
//! ```
//!
//! ## Límites
//!
//! | Recurso              | Límite     | Al excederlo            |
//! |----------------------|------------|-------------------------|
//! | Request line         | 2048 bytes | `RequestLineTooLong`    |
//! | Línea de header      | 8192 bytes | `HeaderLineTooLong`     |
//! | Cantidad de headers  | 64         | `TooManyHeaders`        |
//! | Body                 | 1 MiB      | `BodyTooLarge`          |
//!
//! Nunca se devuelve un request parcial: o se obtiene un [`Request`]
//! completo o un [`ParseError`].

use super::form::{is_form_content_type, normalize_key, parse_form_encoded};
use super::HeaderMap;
use crate::shutdown::ShutdownSignal;
use std::collections::HashMap;
use std::io::{self, BufRead, Cursor, Read};
use std::str::FromStr;
use thiserror::Error;

/// Largo máximo de la request line (sin el `\r\n`)
pub const MAX_REQUEST_LINE_LENGTH: usize = 2048;

/// Largo máximo de cada línea de header
pub const MAX_HEADER_LINE_LENGTH: usize = 8192;

/// Cantidad máxima de líneas de header
pub const MAX_HEADER_COUNT: usize = 64;

/// Tamaño máximo del body (1 MiB)
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

pub const HEADER_CONTENT_LENGTH: &str = "Content-Length";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Métodos HTTP soportados
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
}

impl Method {
    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    /// Parsea un método sin importar mayúsculas (`get` → `GET`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// El stream terminó antes de una request line no vacía
    #[error("Empty request")]
    EmptyRequest,

    #[error("Request line exceeds {limit} bytes")]
    RequestLineTooLong { limit: usize },

    #[error("Header line exceeds {limit} bytes")]
    HeaderLineTooLong { limit: usize },

    /// La request line no tiene exactamente 3 tokens o no es UTF-8
    #[error("Invalid request line format")]
    InvalidRequestLine,

    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    #[error("More than {limit} headers")]
    TooManyHeaders { limit: usize },

    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    #[error("Body of {length} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { length: usize, limit: usize },

    /// El stream terminó antes de entregar `Content-Length` bytes
    #[error("Body truncated: expected {expected} bytes, received {received}")]
    TruncatedBody { expected: usize, received: usize },

    /// El cliente no terminó de enviar el request dentro del plazo
    #[error("Timed out while reading request")]
    Timeout,

    /// Se activó la señal de apagado mientras se leía
    #[error("Request reading cancelled by shutdown")]
    Cancelled,

    #[error("I/O error while reading request: {0:?}")]
    Io(io::ErrorKind),
}

/// Representa un request HTTP parseado
///
/// Todos los campos se derivan una sola vez durante el parsing y no hay
/// forma de modificarlos después.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,

    /// Siempre no vacío y empieza con `/`
    path: String,

    /// Query string cruda (lo que sigue al primer `?`)
    query_string: String,

    version: String,

    headers: HeaderMap,

    body: String,

    query_params: HashMap<String, String>,

    /// Solo se llena si el body es `application/x-www-form-urlencoded`
    form_params: HashMap<String, String>,
}

impl Request {
    /// Parsea un request completo que ya está en memoria
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use music_server::http::Request;
    ///
    /// let raw = b"GET /status?x=1 HTTP/1.1\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.path(), "/status");
    /// assert_eq!(request.query_param("x"), Some("1"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        Self::read_from(&mut Cursor::new(buffer), &ShutdownSignal::new())
    }

    /// Lee y parsea un request desde un stream
    ///
    /// `shutdown` se consulta entre líneas y entre lecturas del body; si se
    /// activa el resultado es [`ParseError::Cancelled`].
    pub fn read_from<R: BufRead>(reader: &mut R, shutdown: &ShutdownSignal) -> Result<Self, ParseError> {
        // 1. Request line (saltando líneas vacías previas)
        let request_line = loop {
            check_shutdown(shutdown)?;
            match read_line(reader, MAX_REQUEST_LINE_LENGTH, shutdown)? {
                None => return Err(ParseError::EmptyRequest),
                Some(line) if line.is_empty() => continue,
                Some(line) => break line,
            }
        };
        let request_line = String::from_utf8(request_line).map_err(|_| ParseError::InvalidRequestLine)?;
        let (method, target, version) = Self::parse_request_line(&request_line)?;
        let (path, query_string) = split_target(target);

        // 2. Headers
        let headers = Self::read_headers(reader, shutdown)?;

        // 3. Body
        let body = Self::read_body(reader, &headers, shutdown)?;

        // 4. Parámetros
        let query_params = parse_form_encoded(&query_string);
        let form_params = match headers.get(HEADER_CONTENT_TYPE) {
            Some(content_type) if is_form_content_type(content_type) => parse_form_encoded(&body),
            _ => HashMap::new(),
        };

        Ok(Request {
            method,
            path,
            query_string,
            version: version.to_string(),
            headers,
            body,
            query_params,
            form_params,
        })
    }

    /// Formato: `GET /path?query HTTP/1.1`, exactamente 3 tokens
    fn parse_request_line(line: &str) -> Result<(Method, &str, &str), ParseError> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(ParseError::InvalidRequestLine);
        }

        let method = parts[0].parse::<Method>()?;
        Ok((method, parts[1], parts[2]))
    }

    /// Lee headers hasta la línea vacía o el fin del stream
    fn read_headers<R: BufRead>(reader: &mut R, shutdown: &ShutdownSignal) -> Result<HeaderMap, ParseError> {
        let mut headers = HeaderMap::new();
        let mut count = 0;

        loop {
            check_shutdown(shutdown)?;
            let line = match read_line(reader, MAX_HEADER_LINE_LENGTH, shutdown)? {
                None => break,
                Some(line) if line.is_empty() => break,
                Some(line) => line,
            };

            count += 1;
            if count > MAX_HEADER_COUNT {
                return Err(ParseError::TooManyHeaders { limit: MAX_HEADER_COUNT });
            }

            let line = String::from_utf8_lossy(&line);
            // Sin ':' o con nombre vacío: se ignora
            let Some(colon_pos) = line.find(':') else {
                continue;
            };
            let name = line[..colon_pos].trim();
            if name.is_empty() {
                continue;
            }
            headers.insert(name, line[colon_pos + 1..].trim());
        }

        Ok(headers)
    }

    /// Lee exactamente `Content-Length` bytes
    fn read_body<R: BufRead>(reader: &mut R, headers: &HeaderMap, shutdown: &ShutdownSignal) -> Result<String, ParseError> {
        let Some(raw_length) = headers.get(HEADER_CONTENT_LENGTH) else {
            return Ok(String::new());
        };

        let length: i64 = raw_length
            .parse()
            .map_err(|_| ParseError::InvalidContentLength(raw_length.to_string()))?;
        if length < 0 {
            return Err(ParseError::InvalidContentLength(raw_length.to_string()));
        }
        let length = usize::try_from(length).unwrap_or(usize::MAX);
        if length > MAX_BODY_SIZE {
            return Err(ParseError::BodyTooLarge { length, limit: MAX_BODY_SIZE });
        }

        let mut buffer = vec![0u8; length];
        let mut received = 0;
        while received < length {
            check_shutdown(shutdown)?;
            match reader.read(&mut buffer[received..]) {
                Ok(0) => {
                    return Err(ParseError::TruncatedBody { expected: length, received });
                }
                Ok(n) => received += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(map_io_error(e, shutdown)),
            }
        }

        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Serializa el request al formato de wire
    ///
    /// Útil para clientes y tests; `parse(to_bytes())` reproduce el mismo
    /// método, path, headers y body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut target = self.path.clone();
        if !self.query_string.is_empty() {
            target.push('?');
            target.push_str(&self.query_string);
        }

        let mut result = format!("{} {} {}\r\n", self.method, target, self.version).into_bytes();
        for (name, value) in self.headers.iter() {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }
        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(self.body.as_bytes());
        result
    }

    // === Métodos públicos para acceder a los campos ===

    pub fn method(&self) -> Method {
        self.method
    }

    /// Compara el método sin importar mayúsculas
    pub fn is_method(&self, method: &str) -> bool {
        self.method.as_str().eq_ignore_ascii_case(method.trim())
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Obtiene un header específico (sin importar mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn query_params(&self) -> &HashMap<String, String> {
        &self.query_params
    }

    /// Keys en minúsculas; la búsqueda no distingue mayúsculas
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(&normalize_key(name)).map(|s| s.as_str())
    }

    pub fn form_params(&self) -> &HashMap<String, String> {
        &self.form_params
    }

    pub fn form_param(&self, name: &str) -> Option<&str> {
        self.form_params.get(&normalize_key(name)).map(|s| s.as_str())
    }

    /// Busca un parámetro primero en el formulario y luego en la query
    ///
    /// # Ejemplo
    /// ```
    /// use music_server::http::Request;
    ///
    /// let raw = b"POST /action?title=query HTTP/1.1\r\n\
    ///     Content-Type: application/x-www-form-urlencoded\r\n\
    ///     Content-Length: 10\r\n\r\ntitle=form";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.param("title"), Some("form"));
    /// ```
    pub fn param(&self, name: &str) -> Option<&str> {
        self.form_param(name).or_else(|| self.query_param(name))
    }
}

/// Separa el target en path y query string en el primer `?`
///
/// Un path vacío (`""` o `"?x=1"`) se resuelve como `/`.
fn split_target(target: &str) -> (String, String) {
    let (path, query) = match target.find('?') {
        Some(index) => (&target[..index], &target[index + 1..]),
        None => (target, ""),
    };

    let path = if path.is_empty() { "/" } else { path };
    (path.to_string(), query.to_string())
}

/// Lee una línea terminada en `\n` (con o sin `\r`) de hasta `max` bytes
///
/// Retorna `None` si el stream terminó sin datos. Una línea más larga
/// que `max` es un error: nunca se trunca.
fn read_line<R: BufRead>(reader: &mut R, max: usize, shutdown: &ShutdownSignal) -> Result<Option<Vec<u8>>, ParseError> {
    let too_long = || {
        if max == MAX_REQUEST_LINE_LENGTH {
            ParseError::RequestLineTooLong { limit: max }
        } else {
            ParseError::HeaderLineTooLong { limit: max }
        }
    };

    // max + "\r\n"
    let limit = max + 2;
    let mut line = Vec::new();
    let read = loop {
        match reader.by_ref().take(limit as u64).read_until(b'\n', &mut line) {
            Ok(n) => break n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(map_io_error(e, shutdown)),
        }
    };

    if read == 0 {
        return Ok(None);
    }

    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    } else if read >= limit {
        return Err(too_long());
    }

    if line.len() > max {
        return Err(too_long());
    }

    Ok(Some(line))
}

fn check_shutdown(shutdown: &ShutdownSignal) -> Result<(), ParseError> {
    if shutdown.is_triggered() {
        Err(ParseError::Cancelled)
    } else {
        Ok(())
    }
}

fn map_io_error(error: io::Error, shutdown: &ShutdownSignal) -> ParseError {
    if shutdown.is_triggered() {
        return ParseError::Cancelled;
    }
    match error.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => ParseError::Timeout,
        kind => ParseError::Io(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_get() {
        let raw = b"GET / HTTP/1.1\r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.path(), "/");
        assert_eq!(request.version(), "HTTP/1.1");
        assert!(request.query_params().is_empty());
        assert!(request.body().is_empty());
    }

    #[test]
    fn test_method_is_case_insensitive() {
        let request = Request::parse(b"post /action HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.method(), Method::POST);
        assert!(request.is_method("Post"));
        assert!(!request.is_method("GET"));
    }

    #[test]
    fn test_unsupported_method() {
        let result = Request::parse(b"BREW /pot HTTP/1.1\r\n\r\n");
        assert_eq!(result.unwrap_err(), ParseError::UnsupportedMethod("BREW".to_string()));
    }

    #[test]
    fn test_leading_blank_lines_are_skipped() {
        let request = Request::parse(b"\r\n\r\n\nGET /status HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), "/status");
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(Request::parse(b"").unwrap_err(), ParseError::EmptyRequest);
        assert_eq!(Request::parse(b"\r\n\r\n").unwrap_err(), ParseError::EmptyRequest);
    }

    #[test]
    fn test_invalid_request_line() {
        for raw in [&b"GET\r\n\r\n"[..], b"GET /\r\n\r\n", b"GET / HTTP/1.1 extra\r\n\r\n", b"   \r\n\r\n"] {
            assert_eq!(Request::parse(raw).unwrap_err(), ParseError::InvalidRequestLine);
        }
    }

    #[test]
    fn test_non_utf8_request_line() {
        let raw = b"\x00\x01\xff\xfe garbage here\r\n\r\n";
        assert_eq!(Request::parse(raw).unwrap_err(), ParseError::InvalidRequestLine);
    }

    #[test]
    fn test_request_line_at_limit_is_accepted() {
        // "GET " + path + " HTTP/1.1" == 2048 bytes
        let path_len = MAX_REQUEST_LINE_LENGTH - "GET ".len() - " HTTP/1.1".len();
        let path = format!("/{}", "a".repeat(path_len - 1));
        let raw = format!("GET {} HTTP/1.1\r\n\r\n", path);

        let request = Request::parse(raw.as_bytes()).unwrap();
        assert_eq!(request.path(), path);
    }

    #[test]
    fn test_request_line_over_limit_is_rejected() {
        let path = format!("/{}", "a".repeat(MAX_REQUEST_LINE_LENGTH));
        let raw = format!("GET {} HTTP/1.1\r\n\r\n", path);
        assert_eq!(
            Request::parse(raw.as_bytes()).unwrap_err(),
            ParseError::RequestLineTooLong { limit: MAX_REQUEST_LINE_LENGTH }
        );

        // Sin terminador de línea
        let raw = "G".repeat(MAX_REQUEST_LINE_LENGTH + 10);
        assert!(matches!(
            Request::parse(raw.as_bytes()),
            Err(ParseError::RequestLineTooLong { .. })
        ));
    }

    #[test]
    fn test_target_splitting() {
        let request = Request::parse(b"GET /search?q=a?b HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), "/search");
        assert_eq!(request.query_string(), "q=a?b");
        assert_eq!(request.query_param("q"), Some("a?b"));

        let request = Request::parse(b"GET ?x=1 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), "/");
        assert_eq!(request.query_string(), "x=1");

        let request = Request::parse(b"GET /status? HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.path(), "/status");
        assert_eq!(request.query_string(), "");
    }

    #[test]
    fn test_parse_with_headers() {
        let raw = b"GET / HTTP/1.1\r\nHost: localhost:8080\r\nUser-Agent:  test  \r\n\r\n";
        let request = Request::parse(raw).unwrap();

        assert_eq!(request.header("host"), Some("localhost:8080"));
        assert_eq!(request.header("USER-AGENT"), Some("test"));
    }

    #[test]
    fn test_header_value_keeps_later_colons() {
        let request = Request::parse(b"GET / HTTP/1.1\r\nReferer: http://x:1/a\r\n\r\n").unwrap();
        assert_eq!(request.header("Referer"), Some("http://x:1/a"));
    }

    #[test]
    fn test_duplicate_header_last_wins() {
        let raw = b"GET / HTTP/1.1\r\nX-Id: 1\r\nx-id: 2\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("X-Id"), Some("2"));
    }

    #[test]
    fn test_malformed_header_lines_are_skipped() {
        let raw = b"GET / HTTP/1.1\r\n: no-name\r\nno colon here\r\nHost: ok\r\n\r\n";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.headers().len(), 1);
        assert_eq!(request.header("Host"), Some("ok"));
    }

    #[test]
    fn test_header_limit() {
        let mut raw = String::from("GET / HTTP/1.1\r\n");
        for i in 0..MAX_HEADER_COUNT {
            raw.push_str(&format!("X-H{}: v\r\n", i));
        }
        let ok = format!("{}\r\n", raw);
        assert_eq!(Request::parse(ok.as_bytes()).unwrap().headers().len(), MAX_HEADER_COUNT);

        raw.push_str("X-One-Too-Many: v\r\n\r\n");
        assert_eq!(
            Request::parse(raw.as_bytes()).unwrap_err(),
            ParseError::TooManyHeaders { limit: MAX_HEADER_COUNT }
        );
    }

    #[test]
    fn test_headers_end_at_stream_end() {
        let request = Request::parse(b"GET / HTTP/1.1\r\nHost: a").unwrap();
        assert_eq!(request.header("Host"), Some("a"));
    }

    #[test]
    fn test_body_with_content_length() {
        let raw = b"POST /echo HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let request = Request::parse(raw).unwrap();
        assert_eq!(request.body(), "hello");
        assert!(request.form_params().is_empty());
    }

    #[test]
    fn test_body_is_bounded_by_content_length() {
        let raw = b"POST /echo HTTP/1.1\r\nContent-Length: 3\r\n\r\nhello";
        assert_eq!(Request::parse(raw).unwrap().body(), "hel");
    }

    #[test]
    fn test_body_without_content_length_is_empty() {
        let raw = b"POST /echo HTTP/1.1\r\n\r\nignored";
        assert_eq!(Request::parse(raw).unwrap().body(), "");
    }

    #[test]
    fn test_invalid_content_length() {
        for value in ["abc", "-1", "1.5", ""] {
            let raw = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", value);
            assert!(
                matches!(Request::parse(raw.as_bytes()), Err(ParseError::InvalidContentLength(_))),
                "value {:?}",
                value
            );
        }
    }

    #[test]
    fn test_body_over_limit() {
        let raw = format!("POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_BODY_SIZE + 1);
        assert_eq!(
            Request::parse(raw.as_bytes()).unwrap_err(),
            ParseError::BodyTooLarge { length: MAX_BODY_SIZE + 1, limit: MAX_BODY_SIZE }
        );
    }

    #[test]
    fn test_truncated_body() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";
        assert_eq!(
            Request::parse(raw).unwrap_err(),
            ParseError::TruncatedBody { expected: 10, received: 3 }
        );
    }

    #[test]
    fn test_form_body_is_decoded() {
        let body = "title=Flowers&artist=Miley+Cyrus";
        let raw = format!(
            "POST /action HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let request = Request::parse(raw.as_bytes()).unwrap();

        assert_eq!(request.form_param("title"), Some("Flowers"));
        assert_eq!(request.form_param("artist"), Some("Miley Cyrus"));
        assert_eq!(request.param("artist"), Some("Miley Cyrus"));
    }

    #[test]
    fn test_non_form_body_is_not_decoded() {
        let body = r#"{"title":"x"}"#;
        let raw = format!(
            "POST /api HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let request = Request::parse(raw.as_bytes()).unwrap();
        assert!(request.form_params().is_empty());
        assert_eq!(request.body(), body);
    }

    #[test]
    fn test_param_falls_back_to_query() {
        let request = Request::parse(b"GET /delete?id=not-a-guid HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.param("id"), Some("not-a-guid"));
        assert_eq!(request.param("missing"), None);
    }

    #[test]
    fn test_param_names_ignore_case() {
        let body = "Title=Flowers&ARTIST=Miley+Cyrus";
        let raw = format!(
            "POST /action?ID=x HTTP/1.1\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        let request = Request::parse(raw.as_bytes()).unwrap();

        assert_eq!(request.param("title"), Some("Flowers"));
        assert_eq!(request.param("artist"), Some("Miley Cyrus"));
        assert_eq!(request.form_param("TITLE"), Some("Flowers"));
        assert_eq!(request.query_param("id"), Some("x"));
        assert_eq!(request.param("Id"), Some("x"));
    }

    #[test]
    fn test_query_keys_differing_in_case_collapse() {
        let request = Request::parse(b"GET /?k=1&K=2 HTTP/1.1\r\n\r\n").unwrap();
        assert_eq!(request.query_params().len(), 1);
        assert_eq!(request.query_param("k"), Some("2"));
    }

    #[test]
    fn test_multibyte_body_length_in_bytes() {
        let body = "título=canción";
        let raw = format!(
            "POST / HTTP/1.1\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        assert_eq!(Request::parse(raw.as_bytes()).unwrap().body(), body);
    }

    #[test]
    fn test_roundtrip_through_to_bytes() {
        let raw = b"POST /action?src=web HTTP/1.1\r\nHost: localhost\r\nContent-Type: text/plain\r\nContent-Length: 11\r\n\r\nhello world";
        let original = Request::parse(raw).unwrap();
        let reparsed = Request::parse(&original.to_bytes()).unwrap();

        assert_eq!(reparsed.method(), original.method());
        assert_eq!(reparsed.path(), original.path());
        assert_eq!(reparsed.query_string(), original.query_string());
        assert_eq!(reparsed.headers(), original.headers());
        assert_eq!(reparsed.body(), original.body());
    }

    #[test]
    fn test_cancelled_before_reading() {
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();
        let mut reader = Cursor::new(&b"GET / HTTP/1.1\r\n\r\n"[..]);
        assert_eq!(Request::read_from(&mut reader, &shutdown).unwrap_err(), ParseError::Cancelled);
    }

    /// Reader que falla con el `ErrorKind` dado una vez agotados los datos
    struct FailingReader {
        data: Cursor<Vec<u8>>,
        kind: io::ErrorKind,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(self.kind, "boom"));
            }
            Ok(n)
        }
    }

    /// Entrega los datos y después activa el apagado, como un socket
    /// al que se le agotó el read timeout mientras el servidor se detiene
    struct StallThenShutdown {
        data: Cursor<Vec<u8>>,
        shutdown: ShutdownSignal,
    }

    impl Read for StallThenShutdown {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                self.shutdown.trigger();
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "no data yet"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_shutdown_during_body_cancels() {
        let shutdown = ShutdownSignal::new();
        let reader = StallThenShutdown {
            data: Cursor::new(b"POST /action HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc".to_vec()),
            shutdown: shutdown.clone(),
        };
        let mut reader = io::BufReader::new(reader);

        let result = Request::read_from(&mut reader, &shutdown);
        assert_eq!(result.unwrap_err(), ParseError::Cancelled);
        assert!(shutdown.is_triggered());
    }

    #[test]
    fn test_read_timeout_maps_to_timeout() {
        let reader = FailingReader {
            data: Cursor::new(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc".to_vec()),
            kind: io::ErrorKind::TimedOut,
        };
        let mut reader = io::BufReader::new(reader);
        assert_eq!(
            Request::read_from(&mut reader, &ShutdownSignal::new()).unwrap_err(),
            ParseError::Timeout
        );
    }

    #[test]
    fn test_reset_maps_to_io_error() {
        let reader = FailingReader {
            data: Cursor::new(b"GET / HTTP/1.1\r\n".to_vec()),
            kind: io::ErrorKind::ConnectionReset,
        };
        let mut reader = io::BufReader::new(reader);
        assert_eq!(
            Request::read_from(&mut reader, &ShutdownSignal::new()).unwrap_err(),
            ParseError::Io(io::ErrorKind::ConnectionReset)
        );
    }
}
